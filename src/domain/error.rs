use thiserror::Error;

/// Errors raised while decoding or compiling a filter expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Invalid filter format: {message}")]
    InvalidFormat { message: String },

    #[error("Logical operator '{operator}' must be a list")]
    LogicalOperandNotList { operator: String },

    #[error("Condition for '{field}' has more than one operator: {operators}")]
    MultipleOperators { field: String, operators: String },

    #[error("Unknown operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    #[error("Operator '{operator}' is not supported for {class} field '{field}'")]
    UnsupportedOperator {
        field: String,
        operator: String,
        class: String,
    },

    #[error("Invalid operand for '{operator}' on field '{field}': {message}")]
    InvalidOperand {
        field: String,
        operator: String,
        message: String,
    },

    #[error("Invalid UUID format for field '{field}': {value}")]
    InvalidUuid { field: String, value: String },

    #[error("Invalid field name: {field}")]
    InvalidField { field: String },

    #[error("Value for '{field}' cannot be serialized to JSON: {message}")]
    NotSerializable { field: String, message: String },

    #[error("Filter nesting exceeds maximum depth of {max}")]
    MaxDepthExceeded { max: usize },
}

impl FilterError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn logical_operand_not_list(operator: impl Into<String>) -> Self {
        Self::LogicalOperandNotList {
            operator: operator.into(),
        }
    }

    pub fn multiple_operators(field: impl Into<String>, operators: &[&str]) -> Self {
        Self::MultipleOperators {
            field: field.into(),
            operators: operators.join(", "),
        }
    }

    pub fn unknown_operator(field: impl Into<String>, operator: impl Into<String>) -> Self {
        Self::UnknownOperator {
            field: field.into(),
            operator: operator.into(),
        }
    }

    pub fn unsupported_operator(
        field: impl Into<String>,
        operator: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self::UnsupportedOperator {
            field: field.into(),
            operator: operator.into(),
            class: class.into(),
        }
    }

    pub fn invalid_operand(
        field: impl Into<String>,
        operator: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidOperand {
            field: field.into(),
            operator: operator.into(),
            message: message.into(),
        }
    }

    pub fn invalid_uuid(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidUuid {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
        }
    }

    pub fn not_serializable(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotSerializable {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn max_depth_exceeded(max: usize) -> Self {
        Self::MaxDepthExceeded { max }
    }
}
