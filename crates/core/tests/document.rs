//! End-to-end document construction through the public API.

use serde_json::json;
use stackform_core::{
    fn_equals, fn_if, fn_sub, name_tag_sub, EntityKind, Expr, MappingDef, OutputDef,
    ParameterDef, PseudoParameter, ResourceDef, Stack, StackError, SubstitutionMap,
};

#[test]
fn sub_scenario_with_region_and_bucket() {
    let mut subs = SubstitutionMap::new();
    subs.insert("Bucket".to_string(), Expr::Ref("MyBucket".to_string()));
    let e = fn_sub("${AWS::Region}-${Bucket}", Some(subs)).unwrap();
    assert_eq!(
        serde_json::to_value(&e).unwrap(),
        json!({"Fn::Sub": ["${AWS::Region}-${Bucket}", {"Bucket": {"Ref": "MyBucket"}}]})
    );
}

#[test]
fn sub_scenario_bogus_pseudo_parameter() {
    let err = fn_sub("${AWS::Bogus}", None).unwrap_err();
    assert_eq!(err.code(), "UnknownPseudoParameter");
    let msg = err.to_string();
    for name in [
        "AWS::AccountId",
        "AWS::NotificationARNs",
        "AWS::NoValue",
        "AWS::Partition",
        "AWS::Region",
        "AWS::StackId",
        "AWS::StackName",
        "AWS::URLSuffix",
    ] {
        assert!(msg.contains(name), "message missing {}: {}", name, msg);
    }
}

#[test]
fn sub_scenario_name_without_map() {
    assert!(matches!(
        fn_sub("${Name}", None),
        Err(StackError::UnknownSubstitutionKey { .. })
    ));
}

#[test]
fn duplicate_web_server_keeps_first() {
    let mut stack = Stack::default();
    stack
        .add_resource(
            "WebServer",
            ResourceDef::new("AWS::EC2::Instance").property("InstanceType", "t2.micro"),
        )
        .unwrap();
    let err = stack
        .add_resource(
            "WebServer",
            ResourceDef::new("AWS::EC2::Instance").property("InstanceType", "t3.large"),
        )
        .unwrap_err();
    assert_eq!(err.code(), "DuplicateIdentifier");
    assert_eq!(stack.len(), 1);
    assert_eq!(
        stack.to_json()["Resources"]["WebServer"]["Properties"]["InstanceType"],
        "t2.micro"
    );
}

#[test]
fn registration_order_is_reproduced_per_section() {
    let names = ["Queue", "Bucket", "Topic", "Table", "Alarm"];
    let mut stack = Stack::default();
    for name in names {
        stack
            .add_resource(name, ResourceDef::new("Custom::Thing"))
            .unwrap();
    }
    let doc = stack.to_json();
    let emitted: Vec<&str> = doc["Resources"]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(emitted, names);
}

#[test]
fn serialization_is_deterministic() {
    let build = || {
        let mut stack = Stack::new("determinism");
        let env = stack
            .add_parameter("Env", ParameterDef::new("String").default_value("dev"))
            .unwrap();
        let prod = stack
            .add_condition("IsProd", fn_equals(env.reference(), "prod"))
            .unwrap();
        stack
            .add_resource(
                "Bucket",
                ResourceDef::new("AWS::S3::Bucket").property(
                    "VersioningConfiguration",
                    fn_if(
                        &prod.condition(),
                        Expr::object([("Status", "Enabled")]),
                        PseudoParameter::NoValue,
                    ),
                ),
            )
            .unwrap();
        stack.to_json_pretty()
    };
    assert_eq!(build(), build());
}

#[test]
fn instance_and_volume_document() {
    let mut stack = Stack::new(
        "\nThis template creates an EC2 instance and an EBS volume attached to it.",
    );
    let subnet = stack
        .add_parameter(
            "WebServerSubnet",
            ParameterDef::new("AWS::EC2::Subnet::Id")
                .description("The subnet of the web server instance."),
        )
        .unwrap();
    let images = stack
        .add_mapping(
            "RegionImages",
            MappingDef::new()
                .entry("eu-west-1", [("ImageId", "ami-0fe0b2cf0e1f25c8a")])
                .entry("us-east-1", [("ImageId", "ami-0b5eea76982371e91")]),
        )
        .unwrap();
    let instance = stack
        .add_resource(
            "WebServerInstance",
            ResourceDef::new("AWS::EC2::Instance")
                .property("InstanceType", "t2.micro")
                .property("SubnetId", subnet.reference())
                .property(
                    "ImageId",
                    images.find_in_map(PseudoParameter::Region, "ImageId"),
                )
                .property(
                    "Tags",
                    vec![name_tag_sub("${AWS::StackName}-WebServer").unwrap()],
                ),
        )
        .unwrap();
    stack
        .add_resource(
            "EbsVolume",
            ResourceDef::new("AWS::EC2::Volume")
                .property("AvailabilityZone", instance.attr("AvailabilityZone"))
                .property("VolumeType", "gp2")
                .property("Size", 10),
        )
        .unwrap();

    assert_eq!(
        stack.to_json(),
        json!({
            "Description": "\nThis template creates an EC2 instance and an EBS volume attached to it.",
            "Parameters": {
                "WebServerSubnet": {
                    "Type": "AWS::EC2::Subnet::Id",
                    "Description": "The subnet of the web server instance."
                }
            },
            "Mappings": {
                "RegionImages": {
                    "eu-west-1": {"ImageId": "ami-0fe0b2cf0e1f25c8a"},
                    "us-east-1": {"ImageId": "ami-0b5eea76982371e91"}
                }
            },
            "Resources": {
                "WebServerInstance": {
                    "Type": "AWS::EC2::Instance",
                    "Properties": {
                        "InstanceType": "t2.micro",
                        "SubnetId": {"Ref": "WebServerSubnet"},
                        "ImageId": {"Fn::FindInMap": ["RegionImages", {"Ref": "AWS::Region"}, "ImageId"]},
                        "Tags": [{"Key": "Name", "Value": {"Fn::Sub": "${AWS::StackName}-WebServer"}}]
                    }
                },
                "EbsVolume": {
                    "Type": "AWS::EC2::Volume",
                    "Properties": {
                        "AvailabilityZone": {"Fn::GetAtt": ["WebServerInstance", "AvailabilityZone"]},
                        "VolumeType": "gp2",
                        "Size": 10
                    }
                }
            }
        })
    );
}

#[test]
fn output_condition_must_name_registered_condition() {
    let mut stack = Stack::default();
    let mut scratch = Stack::default();
    let foreign = scratch
        .add_condition("Elsewhere", fn_equals("a", "a"))
        .unwrap();
    let err = stack
        .add_output(
            "Out",
            OutputDef::new("value").condition(foreign.condition()),
        )
        .unwrap_err();
    assert_eq!(
        err,
        StackError::DanglingReference {
            kind: EntityKind::Output,
            id: "Out".to_string(),
            target: "Elsewhere".to_string(),
        }
    );
}

#[test]
fn depends_on_requires_resource() {
    let mut stack = Stack::default();
    let gateway = stack
        .add_resource("Gateway", ResourceDef::new("AWS::EC2::InternetGateway"))
        .unwrap();
    stack
        .add_resource(
            "Route",
            ResourceDef::new("AWS::EC2::Route").depends_on(&gateway),
        )
        .unwrap();
    assert_eq!(
        stack.to_json()["Resources"]["Route"],
        json!({"Type": "AWS::EC2::Route", "DependsOn": ["Gateway"]})
    );
}
