use stackform_core::{name_tag_sub, Expr, ParameterDef, PseudoParameter, ResourceDef, Result, Stack};

use super::web_server::region_images;

const DESCRIPTION: &str = "
Instance and volume template.
This template creates an EC2 instance and an EBS volume attached to it.
";

pub(crate) fn build() -> Result<Stack> {
    let mut stack = Stack::new(DESCRIPTION.trim());

    // Parameters
    let subnet = stack.add_parameter(
        "WebServerSubnet",
        ParameterDef::new("AWS::EC2::Subnet::Id")
            .description("The subnet of the web server instance."),
    )?;

    // Mappings
    let images = stack.add_mapping("RegionImages", region_images())?;

    // Resources
    let instance = stack.add_resource(
        "WebServerInstance",
        ResourceDef::new("AWS::EC2::Instance")
            .property("InstanceType", "t2.micro")
            .property("SubnetId", subnet.reference())
            .property("ImageId", images.find_in_map(PseudoParameter::Region, "ImageId"))
            .property("Tags", Expr::list([name_tag_sub("${AWS::StackName}-WebServer")?])),
    )?;

    stack.add_resource(
        "EbsVolume",
        ResourceDef::new("AWS::EC2::Volume")
            .property("AvailabilityZone", instance.attr("AvailabilityZone"))
            .property("VolumeType", "gp2")
            .property("Size", 10)
            .property("Tags", Expr::list([name_tag_sub("${AWS::StackName}-Volume")?])),
    )?;

    Ok(stack)
}
