//! Intrinsic function constructors: `Fn::Sub`, `Fn::If`, `Fn::Equals`.
//!
//! `fn_sub` is the only constructor that validates its input: every
//! `${...}` placeholder in the template must name either a pseudo parameter
//! (colon-qualified) or a key of the supplied substitution map. The other
//! two are pure structural assembly. The registry runs the same placeholder
//! check again over every `Sub` it is handed, so a hand-built
//! `Expr::Sub` cannot skip it.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, StackError};
use crate::expr::{ConditionRef, Expr, SubstitutionMap};
use crate::pseudo::PseudoParameter;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{[A-Za-z0-9:]+\}").expect("placeholder pattern is a valid regex")
});

/// Build a validated `Fn::Sub` expression.
///
/// Without a substitution map the result serializes as the bare template
/// string; with one (even empty) it serializes as `[template, map]`.
pub fn fn_sub(template: impl Into<String>, substitutions: Option<SubstitutionMap>) -> Result<Expr> {
    let template = template.into();
    check_placeholders(&template, substitutions.as_ref())?;
    Ok(Expr::Sub {
        template,
        substitutions,
    })
}

/// Check every `${...}` placeholder in `template`.
///
/// Colon-qualified names must be pseudo parameters; plain names must be keys
/// of `substitutions`. The first failing placeholder is reported.
pub(crate) fn check_placeholders(
    template: &str,
    substitutions: Option<&SubstitutionMap>,
) -> Result<()> {
    for m in PLACEHOLDER_RE.find_iter(template) {
        let placeholder = m.as_str();
        let name = &placeholder[2..placeholder.len() - 1];

        if name.contains(':') {
            if PseudoParameter::from_name(name).is_none() {
                return Err(StackError::UnknownPseudoParameter {
                    placeholder: placeholder.to_owned(),
                    valid: PseudoParameter::valid_names(),
                });
            }
            continue;
        }

        let known = substitutions.is_some_and(|subs| subs.contains_key(name));
        if !known {
            return Err(StackError::UnknownSubstitutionKey {
                placeholder: placeholder.to_owned(),
            });
        }
    }
    Ok(())
}

/// `{"Fn::If": [condition, then, otherwise]}`
pub fn fn_if(condition: &ConditionRef, then: impl Into<Expr>, otherwise: impl Into<Expr>) -> Expr {
    Expr::If {
        condition: condition.name().to_owned(),
        then: Box::new(then.into()),
        otherwise: Box::new(otherwise.into()),
    }
}

/// `{"Fn::Equals": [lhs, rhs]}`
pub fn fn_equals(lhs: impl Into<Expr>, rhs: impl Into<Expr>) -> Expr {
    Expr::Equals(Box::new(lhs.into()), Box::new(rhs.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subs(pairs: &[(&str, Expr)]) -> SubstitutionMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn pseudo_only_template_stays_bare_string() {
        let e = fn_sub("${AWS::StackName}-WebServer", None).unwrap();
        assert_eq!(e.to_json(), json!({"Fn::Sub": "${AWS::StackName}-WebServer"}));
    }

    #[test]
    fn every_pseudo_parameter_is_accepted() {
        for p in PseudoParameter::ALL {
            let template = format!("prefix-${{{}}}-suffix", p.name());
            assert!(fn_sub(template, None).is_ok(), "{} rejected", p);
        }
    }

    #[test]
    fn template_without_placeholders_is_accepted() {
        let e = fn_sub("plain text with $ and {braces}", None).unwrap();
        assert_eq!(e.to_json(), json!({"Fn::Sub": "plain text with $ and {braces}"}));
    }

    #[test]
    fn substitution_map_produces_pair_form() {
        let e = fn_sub(
            "${AWS::Region}-${Bucket}",
            Some(subs(&[("Bucket", Expr::Ref("MyBucket".to_string()))])),
        )
        .unwrap();
        assert_eq!(
            serde_json::to_string(&e).unwrap(),
            r#"{"Fn::Sub":["${AWS::Region}-${Bucket}",{"Bucket":{"Ref":"MyBucket"}}]}"#
        );
    }

    #[test]
    fn empty_map_still_produces_pair_form() {
        let e = fn_sub("static", Some(SubstitutionMap::new())).unwrap();
        assert_eq!(e.to_json(), json!({"Fn::Sub": ["static", {}]}));
    }

    #[test]
    fn unknown_pseudo_parameter_lists_valid_set() {
        let err = fn_sub("${AWS::Bogus}", None).unwrap_err();
        let StackError::UnknownPseudoParameter { placeholder, valid } = &err else {
            panic!("expected UnknownPseudoParameter, got {:?}", err);
        };
        assert_eq!(placeholder, "${AWS::Bogus}");
        let msg = err.to_string();
        for p in PseudoParameter::ALL {
            assert!(valid.contains(p.name()));
            assert!(msg.contains(p.name()), "message missing {}: {}", p, msg);
        }
    }

    #[test]
    fn pseudo_parameter_in_map_does_not_rescue_bad_qualified_name() {
        let err = fn_sub(
            "${My::Thing}",
            Some(subs(&[("My::Thing", Expr::from("x"))])),
        )
        .unwrap_err();
        assert_eq!(err.code(), "UnknownPseudoParameter");
    }

    #[test]
    fn plain_placeholder_without_map_is_rejected() {
        let err = fn_sub("${Name}", None).unwrap_err();
        assert_eq!(
            err,
            StackError::UnknownSubstitutionKey {
                placeholder: "${Name}".to_string()
            }
        );
    }

    #[test]
    fn plain_placeholder_missing_from_map_is_rejected() {
        let err = fn_sub(
            "${Bucket}-${Prefix}",
            Some(subs(&[("Bucket", Expr::from("b"))])),
        )
        .unwrap_err();
        assert_eq!(err.code(), "UnknownSubstitutionKey");
        assert!(err.to_string().contains("${Prefix}"));
    }

    #[test]
    fn placeholders_with_other_characters_are_literal() {
        // `-` and `.` fall outside the placeholder alphabet, so these are not scanned.
        let e = fn_sub("${Not-A-Key} ${also.literal} ${}", None).unwrap();
        assert_eq!(e.to_json(), json!({"Fn::Sub": "${Not-A-Key} ${also.literal} ${}"}));
    }

    #[test]
    fn first_failing_placeholder_is_reported() {
        let err = fn_sub("${Missing}${AWS::Nope}", None).unwrap_err();
        assert_eq!(err.code(), "UnknownSubstitutionKey");
    }

    #[test]
    fn if_uses_condition_name() {
        let cond = ConditionRef::new("SshAccessAllowed");
        let e = fn_if(
            &cond,
            Expr::Ref("KeyPairName".to_string()),
            PseudoParameter::NoValue,
        );
        assert_eq!(
            e.to_json(),
            json!({"Fn::If": ["SshAccessAllowed", {"Ref": "KeyPairName"}, {"Ref": "AWS::NoValue"}]})
        );
    }

    #[test]
    fn equals_keeps_literal_types() {
        let e = fn_equals(Expr::Ref("NewVolumeOption".to_string()), true);
        assert_eq!(
            e.to_json(),
            json!({"Fn::Equals": [{"Ref": "NewVolumeOption"}, true]})
        );
    }
}
