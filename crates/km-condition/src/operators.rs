//! Comparison operators shared by several condition kinds

km_core::engine_keyword! {
    /// Text comparison used by clipboard, variable, text and window conditions
    #[derive(Default)]
    pub enum TextOperator {
        #[default]
        Is => "Is",
        IsNot => "IsNot",
        Contains => "Contains",
        DoesNotContain => "DoesNotContain",
        StartsWith => "StartsWith",
        EndsWith => "EndsWith",
        Matches => "Matches",
        DoesNotMatch => "DoesNotMatch",
        IsEmpty => "IsEmpty",
        IsNotEmpty => "IsNotEmpty",
    }
}

impl TextOperator {
    /// Whether the operator compares against a value
    ///
    /// Emptiness tests take no operand and the engine drops the value key.
    pub fn takes_operand(&self) -> bool {
        !matches!(self, TextOperator::IsEmpty | TextOperator::IsNotEmpty)
    }
}

km_core::engine_keyword! {
    /// Numeric comparison
    #[derive(Default)]
    pub enum NumericOperator {
        #[default]
        Equal => "IsEqual",
        NotEqual => "IsNotEqual",
        LessThan => "IsLessThan",
        LessThanOrEqual => "IsLessThanOrEqual",
        GreaterThan => "IsGreaterThan",
        GreaterThanOrEqual => "IsGreaterThanOrEqual",
    }
}

km_core::engine_keyword! {
    /// Presence test used by device and volume conditions
    #[derive(Default)]
    pub enum Presence {
        #[default]
        Present => "Present",
        Absent => "Absent",
    }
}

km_core::engine_keyword! {
    /// Key or mouse button state
    #[derive(Default)]
    pub enum PressState {
        #[default]
        Down => "Down",
        Up => "Up",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_operator_operands() {
        assert!(TextOperator::Contains.takes_operand());
        assert!(!TextOperator::IsEmpty.takes_operand());
        assert!(!TextOperator::IsNotEmpty.takes_operand());
    }

    #[test]
    fn test_engine_spellings() {
        assert_eq!(NumericOperator::GreaterThan.as_str(), "IsGreaterThan");
        assert_eq!(TextOperator::from_engine("DoesNotMatch"), Some(TextOperator::DoesNotMatch));
        assert_eq!(Presence::default(), Presence::Present);
    }
}
