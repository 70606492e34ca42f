//! Success envelope shared by all JSON endpoints.

use serde::Serialize;

/// `{"success": true, "data": ...}` wrapper.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Envelope<T> {
    Envelope {
        success: true,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_serializes_with_success_flag() {
        let body = serde_json::to_value(ok(vec![1, 2, 3])).expect("serialize");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"][2], 3);
    }
}
