//! Operator template table
//!
//! Maps each spatial operator onto the SQL function that wraps the property
//! and geometry fragments, and onto the distance comparison (if any) that
//! precedes the wrapped call.

use geofilter_ir::{Number, OperatorKind};

/// Comparison applied to `DISTANCE(...)` before the wrapped call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    /// No distance term
    Plain,
    /// `<= distance`
    AtMost,
    /// `>= distance`
    AtLeast,
}

impl Closing {
    /// Comparison text for a distance, `None` for [`Closing::Plain`]
    pub fn suffix(&self, distance: Option<Number>) -> Option<String> {
        match self {
            Closing::Plain => None,
            Closing::AtMost => distance.map(|d| format!("<= {}", d)),
            Closing::AtLeast => distance.map(|d| format!(">= {}", d)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorTemplate {
    pub function: &'static str,
    pub closing: Closing,
}

impl OperatorTemplate {
    const fn plain(function: &'static str) -> Self {
        Self {
            function,
            closing: Closing::Plain,
        }
    }
}

/// BBOX compares the column against a box literal with the `&&` operator
pub const BBOX_OPERATOR: &str = "&&";

pub fn template_for(operator: OperatorKind) -> OperatorTemplate {
    match operator {
        OperatorKind::Bbox => OperatorTemplate::plain(BBOX_OPERATOR),
        OperatorKind::Intersects => OperatorTemplate::plain("INTERSECTS"),
        OperatorKind::Contains => OperatorTemplate::plain("CONTAINS"),
        OperatorKind::Crosses => OperatorTemplate::plain("CROSSES"),
        OperatorKind::Disjoint => OperatorTemplate::plain("DISJOINT"),
        OperatorKind::Equals => OperatorTemplate::plain("EQUALS"),
        OperatorKind::Overlaps => OperatorTemplate::plain("OVERLAPS"),
        OperatorKind::Touches => OperatorTemplate::plain("TOUCHES"),
        OperatorKind::Within => OperatorTemplate::plain("WITHIN"),
        // Past the threshold the geometries must be disjoint
        OperatorKind::Beyond => OperatorTemplate {
            function: "DISJOINT",
            closing: Closing::AtMost,
        },
        OperatorKind::DWithin => OperatorTemplate {
            function: "DWITHIN",
            closing: Closing::AtLeast,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_operator_has_expected_template() {
        let expected = [
            (OperatorKind::Bbox, "&&", Closing::Plain),
            (OperatorKind::Intersects, "INTERSECTS", Closing::Plain),
            (OperatorKind::Contains, "CONTAINS", Closing::Plain),
            (OperatorKind::Crosses, "CROSSES", Closing::Plain),
            (OperatorKind::Disjoint, "DISJOINT", Closing::Plain),
            (OperatorKind::Equals, "EQUALS", Closing::Plain),
            (OperatorKind::Overlaps, "OVERLAPS", Closing::Plain),
            (OperatorKind::Touches, "TOUCHES", Closing::Plain),
            (OperatorKind::Within, "WITHIN", Closing::Plain),
            (OperatorKind::Beyond, "DISJOINT", Closing::AtMost),
            (OperatorKind::DWithin, "DWITHIN", Closing::AtLeast),
        ];
        assert_eq!(expected.len(), OperatorKind::ALL.len());

        for (operator, function, closing) in expected {
            let template = template_for(operator);
            assert_eq!(template.function, function, "{}", operator);
            assert_eq!(template.closing, closing, "{}", operator);
        }
    }

    #[test]
    fn test_function_matches_operator_name_except_beyond_and_bbox() {
        for operator in OperatorKind::ALL {
            let template = template_for(operator);
            match operator {
                OperatorKind::Beyond => assert_eq!(template.function, "DISJOINT"),
                OperatorKind::Bbox => assert_eq!(template.function, BBOX_OPERATOR),
                _ => assert_eq!(template.function, operator.name()),
            }
        }
    }

    #[test]
    fn test_only_distance_operators_close_with_comparison() {
        for operator in OperatorKind::ALL {
            let has_comparison = template_for(operator).closing != Closing::Plain;
            assert_eq!(has_comparison, operator.is_distance(), "{}", operator);
        }
    }

    #[test]
    fn test_closing_suffix() {
        assert_eq!(Closing::Plain.suffix(Some(Number::Float(5.0))), None);
        assert_eq!(Closing::AtMost.suffix(Some(Number::Float(5.0))).as_deref(), Some("<= 5.0"));
        assert_eq!(Closing::AtLeast.suffix(Some(Number::Int(12))).as_deref(), Some(">= 12"));
        assert_eq!(Closing::AtLeast.suffix(None), None);
    }
}
