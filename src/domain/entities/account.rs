use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// Canonical customer id: dashes removed, digits only ("123-456-7890" -> "1234567890")
pub fn normalize_customer_id(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.trim().chars().filter(|c| *c != '-').collect();
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidCustomerId(raw.to_string()));
    }
    Ok(digits)
}

/// One node of the Google Ads account hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountNode {
    pub customer_id: String,
    /// `None` only for the root of a walk
    pub parent_id: Option<String>,
    pub descriptive_name: String,
    pub is_manager: bool,
}

impl AccountNode {
    pub fn child(parent_id: &str, child: ChildAccount) -> Self {
        Self {
            customer_id: child.customer_id,
            parent_id: Some(parent_id.to_string()),
            descriptive_name: child.descriptive_name,
            is_manager: child.is_manager,
        }
    }

    pub fn root(customer_id: &str, descriptive_name: String) -> Self {
        Self {
            customer_id: customer_id.to_string(),
            parent_id: None,
            descriptive_name,
            is_manager: true,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_manager
    }
}

/// Direct child of a manager account as reported by one hierarchy level query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildAccount {
    pub customer_id: String,
    pub is_manager: bool,
    pub descriptive_name: String,
}
