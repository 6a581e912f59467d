use crate::forms::FormErrors;
use models::ordering::{MAX_ORDER, is_valid_order};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub has_next: bool,
    pub has_prev: bool,
    /// Query string of the next page, other parameters preserved
    pub next: Option<String>,
    /// Query string of the previous page, other parameters preserved
    pub prev: Option<String>,
}

/// New positions keyed by row id, e.g. `{"12": 0, "7": 1}`
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct OrderRequest(pub BTreeMap<i32, i32>);

impl OrderRequest {
    /// `(id, order)` pairs once every position is within `0..=MAX_ORDER`
    ///
    /// Errors are keyed by row id.
    pub fn pairs(&self) -> Result<Vec<(i32, i32)>, FormErrors> {
        let mut errors = FormErrors::new();
        for (id, order) in &self.0 {
            if *order < 0 {
                errors.add(&id.to_string(), "Ensure this value is greater than or equal to 0.");
            } else if !is_valid_order(*order) {
                errors.add(
                    &id.to_string(),
                    format!("Ensure this value is less than or equal to {MAX_ORDER}."),
                );
            }
        }

        errors.finish(self.0.iter().map(|(id, order)| (*id, *order)).collect())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub saved: &'static str,
    pub updated: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_order_request_rejects_out_of_range_positions() {
        let request: OrderRequest =
            serde_json::from_str(r#"{"3": -1, "4": 2147483647, "5": 2}"#).unwrap();

        let errors = request.pairs().unwrap_err();
        assert_eq!(errors.get("3"), ["Ensure this value is greater than or equal to 0."]);
        assert_eq!(errors.get("4").len(), 1);
        assert!(errors.get("5").is_empty());
    }

    #[test]
    fn test_order_request_pairs() {
        let request: OrderRequest = serde_json::from_str(r#"{"12": 0, "7": 1}"#).unwrap();
        assert_eq!(request.pairs().unwrap(), [(7, 1), (12, 0)]);
    }
}
