use std::str::FromStr;

/// One `--set field.operator=value` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub field: String,
    pub operator: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (target, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Expected 'field.operator=value', got: {s}"))?;
        let (field, operator) = target
            .trim()
            .split_once('.')
            .ok_or_else(|| format!("Expected 'field.operator' before '=', got: {target}"))?;
        if field.is_empty() || operator.is_empty() {
            return Err(format!("Empty field or operator in: {s}"));
        }

        Ok(Assignment {
            field: field.to_string(),
            operator: operator.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignment() {
        let a: Assignment = "severity.in=E F".parse().unwrap();
        assert_eq!(a.field, "severity");
        assert_eq!(a.operator, "in");
        assert_eq!(a.value, "E F");
    }

    #[test]
    fn test_value_may_contain_equals() {
        let a: Assignment = "message.match=%a=b%".parse().unwrap();
        assert_eq!(a.value, "%a=b%");
    }

    #[test]
    fn test_empty_value_clears() {
        let a: Assignment = "severity.in=".parse().unwrap();
        assert_eq!(a.value, "");
    }

    #[test]
    fn test_malformed_assignments() {
        assert!("severity".parse::<Assignment>().is_err());
        assert!("severity=E".parse::<Assignment>().is_err());
        assert!(".in=E".parse::<Assignment>().is_err());
    }
}
