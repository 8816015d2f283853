//! Pseudo parameters: the closed set of names the deployment environment
//! provides without declaration.

use std::fmt;

use crate::expr::Expr;

/// One of the eight environment-provided pseudo parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoParameter {
    AccountId,
    NotificationArns,
    NoValue,
    Partition,
    Region,
    StackId,
    StackName,
    UrlSuffix,
}

impl PseudoParameter {
    /// Every pseudo parameter, in canonical order.
    pub const ALL: [PseudoParameter; 8] = [
        PseudoParameter::AccountId,
        PseudoParameter::NotificationArns,
        PseudoParameter::NoValue,
        PseudoParameter::Partition,
        PseudoParameter::Region,
        PseudoParameter::StackId,
        PseudoParameter::StackName,
        PseudoParameter::UrlSuffix,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PseudoParameter::AccountId => "AWS::AccountId",
            PseudoParameter::NotificationArns => "AWS::NotificationARNs",
            PseudoParameter::NoValue => "AWS::NoValue",
            PseudoParameter::Partition => "AWS::Partition",
            PseudoParameter::Region => "AWS::Region",
            PseudoParameter::StackId => "AWS::StackId",
            PseudoParameter::StackName => "AWS::StackName",
            PseudoParameter::UrlSuffix => "AWS::URLSuffix",
        }
    }

    /// Exact, case-sensitive lookup by qualified name.
    pub fn from_name(name: &str) -> Option<PseudoParameter> {
        PseudoParameter::ALL.into_iter().find(|p| p.name() == name)
    }

    /// `{"Ref": "AWS::..."}`
    pub fn reference(self) -> Expr {
        Expr::Ref(self.name().to_owned())
    }

    /// Comma-separated list of all names, used in error messages.
    pub fn valid_names() -> String {
        PseudoParameter::ALL
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for PseudoParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_round_trips_through_lookup() {
        for p in PseudoParameter::ALL {
            assert_eq!(PseudoParameter::from_name(p.name()), Some(p));
        }
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert_eq!(PseudoParameter::from_name("AWS::region"), None);
        assert_eq!(PseudoParameter::from_name("AWS::NotificationArns"), None);
        assert_eq!(PseudoParameter::from_name("Region"), None);
    }

    #[test]
    fn reference_is_plain_ref() {
        assert_eq!(
            PseudoParameter::NoValue.reference().to_json(),
            serde_json::json!({"Ref": "AWS::NoValue"})
        );
    }

    #[test]
    fn valid_names_lists_all_eight() {
        assert_eq!(
            PseudoParameter::valid_names(),
            "AWS::AccountId, AWS::NotificationARNs, AWS::NoValue, AWS::Partition, \
             AWS::Region, AWS::StackId, AWS::StackName, AWS::URLSuffix"
        );
    }
}
