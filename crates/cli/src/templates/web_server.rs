//! Web server behind separate HTTP and SSH security groups, with an EBS
//! volume that is only created when requested.

use stackform_core::{
    fn_equals, fn_if, name_tag_sub, Expr, MappingDef, OutputDef, ParameterDef, PseudoParameter,
    ResourceDef, Result, Stack,
};

/// Region to AMI lookup shared by the instance templates.
pub(super) fn region_images() -> MappingDef {
    MappingDef::new()
        .entry("eu-west-1", [("ImageId", "ami-0fe0b2cf0e1f25c8a")])
        .entry("us-east-1", [("ImageId", "ami-0b5eea76982371e91")])
}

fn ingress(port: u16) -> Expr {
    Expr::object([
        ("CidrIp", Expr::from("0.0.0.0/0")),
        ("IpProtocol", Expr::from("tcp")),
        ("FromPort", Expr::from(port)),
        ("ToPort", Expr::from(port)),
    ])
}

const DESCRIPTION: &str = "
Web server template.
It launches a web server EC2 instance with separate security groups for HTTP and SSH access.
It creates an EBS volume and attaches it to the EC2 instance.
";

pub(crate) fn build() -> Result<Stack> {
    let mut stack = Stack::new(DESCRIPTION.trim());

    // ── Parameters ───────────────────────────────────────────────────

    let vpc_id = stack.add_parameter("VpcId", ParameterDef::new("AWS::EC2::VPC::Id"))?;
    let subnet = stack.add_parameter(
        "WebServerSubnet",
        ParameterDef::new("AWS::EC2::Subnet::Id").description("It should be in the same VPC."),
    )?;
    let volume_size = stack.add_parameter(
        "EbsVolumeSize",
        ParameterDef::new("Number")
            .description("Size in GiB")
            .default_value(10),
    )?;
    let key_pair = stack.add_parameter(
        "KeyPairName",
        ParameterDef::new("AWS::EC2::KeyPair::KeyName"),
    )?;
    // Boolean allowed values on a String parameter are emitted as given.
    let new_volume = stack.add_parameter(
        "NewVolumeOption",
        ParameterDef::new("String")
            .allowed_values([true, false])
            .description("Whether to create and attach an EBS volume"),
    )?;
    let allow_ssh = stack.add_parameter(
        "AllowSshAccess",
        ParameterDef::new("String")
            .allowed_values([true, false])
            .description("Whether to allow SSH access to the web server"),
    )?;

    // ── Conditions ───────────────────────────────────────────────────

    let volume_selected = stack.add_condition(
        "NewVolumeOptionSelected",
        fn_equals(new_volume.reference(), true),
    )?;
    let ssh_allowed =
        stack.add_condition("SshAccessAllowed", fn_equals(allow_ssh.reference(), true))?;

    // ── Mappings ─────────────────────────────────────────────────────

    let images = stack.add_mapping("RegionImages", region_images())?;

    // ── Resources ────────────────────────────────────────────────────

    let http_sg = stack.add_resource(
        "HttpSecurityGroup",
        ResourceDef::new("AWS::EC2::SecurityGroup")
            .property("GroupDescription", "Security group for HTTP access")
            .property("VpcId", vpc_id.reference())
            .property("SecurityGroupIngress", Expr::list([ingress(80)])),
    )?;

    let ssh_sg = stack.add_resource(
        "SshSecurityGroup",
        ResourceDef::new("AWS::EC2::SecurityGroup")
            .condition(ssh_allowed.condition())
            .property("GroupDescription", "Security group to allow SSH access")
            .property("VpcId", vpc_id.reference())
            .property("SecurityGroupIngress", Expr::list([ingress(22)])),
    )?;

    let instance = stack.add_resource(
        "WebServerInstance",
        ResourceDef::new("AWS::EC2::Instance")
            .property("InstanceType", "t2.micro")
            .property("SubnetId", subnet.reference())
            .property("ImageId", images.find_in_map(PseudoParameter::Region, "ImageId"))
            .property(
                "KeyName",
                fn_if(
                    &ssh_allowed.condition(),
                    key_pair.reference(),
                    PseudoParameter::NoValue,
                ),
            )
            .property(
                "SecurityGroupIds",
                Expr::list([
                    http_sg.reference(),
                    fn_if(
                        &ssh_allowed.condition(),
                        ssh_sg.reference(),
                        PseudoParameter::NoValue,
                    ),
                ]),
            )
            .property("Tags", Expr::list([name_tag_sub("${AWS::StackName}-WebServer")?])),
    )?;

    // Same AZ as the instance so the attachment succeeds.
    let volume = stack.add_resource(
        "EbsVolume",
        ResourceDef::new("AWS::EC2::Volume")
            .condition(volume_selected.condition())
            .property("AvailabilityZone", instance.attr("AvailabilityZone"))
            .property("VolumeType", "gp2")
            .property("Size", volume_size.reference())
            .property("Tags", Expr::list([name_tag_sub("${AWS::StackName}-Volume")?])),
    )?;

    stack.add_resource(
        "VolumeAttachment",
        ResourceDef::new("AWS::EC2::VolumeAttachment")
            .condition(volume_selected.condition())
            .property("Device", "/dev/sdf")
            .property("InstanceId", instance.reference())
            .property("VolumeId", volume.reference()),
    )?;

    // ── Metadata ─────────────────────────────────────────────────────

    stack.add_parameter_group("VPC Settings", &[&vpc_id, &subnet])?;
    stack.add_parameter_group("Web Server Settings", &[&key_pair])?;
    stack.add_parameter_group("EBS Volume Settings", &[&volume_size])?;
    stack.add_parameter_label(&vpc_id, "Select a VPC")?;
    stack.add_parameter_label(&subnet, "Select a subnet for the web server")?;
    stack.add_parameter_label(&key_pair, "Select an EC2 key pair")?;

    // ── Outputs ──────────────────────────────────────────────────────

    stack.add_output("WebServerInstanceId", OutputDef::new(instance.reference()))?;
    stack.add_output(
        "WebServerPublicDns",
        OutputDef::new(instance.attr("PublicDnsName"))
            .description("The public DNS name of the web server"),
    )?;
    stack.add_output(
        "EbsVolumeId",
        OutputDef::new(volume.reference()).condition(volume_selected.condition()),
    )?;

    Ok(stack)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_name_is_conditional() {
        let doc = build().unwrap().to_json();
        assert_eq!(
            doc["Resources"]["WebServerInstance"]["Properties"]["KeyName"],
            json!({"Fn::If": ["SshAccessAllowed", {"Ref": "KeyPairName"}, {"Ref": "AWS::NoValue"}]})
        );
    }

    #[test]
    fn conditions_compare_against_boolean_literal() {
        let doc = build().unwrap().to_json();
        assert_eq!(
            doc["Conditions"]["NewVolumeOptionSelected"],
            json!({"Fn::Equals": [{"Ref": "NewVolumeOption"}, true]})
        );
        assert_eq!(
            doc["Parameters"]["AllowSshAccess"]["AllowedValues"],
            json!([true, false])
        );
    }

    #[test]
    fn sections_in_document_order() {
        let doc = build().unwrap().to_json();
        let keys: Vec<&String> = doc.as_object().unwrap().keys().collect();
        assert_eq!(
            keys,
            ["Description", "Parameters", "Mappings", "Conditions", "Resources", "Outputs", "Metadata"]
        );
        let resources: Vec<&String> = doc["Resources"].as_object().unwrap().keys().collect();
        assert_eq!(
            resources,
            [
                "HttpSecurityGroup",
                "SshSecurityGroup",
                "WebServerInstance",
                "EbsVolume",
                "VolumeAttachment"
            ]
        );
    }

    #[test]
    fn volume_output_carries_condition() {
        let doc = build().unwrap().to_json();
        assert_eq!(
            doc["Outputs"]["EbsVolumeId"],
            json!({"Value": {"Ref": "EbsVolume"}, "Condition": "NewVolumeOptionSelected"})
        );
    }
}
