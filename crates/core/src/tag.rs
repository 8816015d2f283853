//! Resource tag helpers.

use crate::error::Result;
use crate::expr::Expr;
use crate::intrinsic::fn_sub;

/// `{"Key": "Name", "Value": value}`
pub fn name_tag(value: impl Into<Expr>) -> Expr {
    tag("Name", value)
}

/// A `Name` tag whose value is a validated `Fn::Sub` template with no
/// substitution map, e.g. `"${AWS::StackName}-WebServer"`.
pub fn name_tag_sub(template: impl Into<String>) -> Result<Expr> {
    Ok(name_tag(fn_sub(template, None)?))
}

pub fn tag(key: impl Into<String>, value: impl Into<Expr>) -> Expr {
    let key: String = key.into();
    Expr::object([("Key", Expr::from(key)), ("Value", value.into())])
}
