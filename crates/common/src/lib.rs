pub mod types;
pub mod utils;
pub mod pagination;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health { status: "ok" };
        assert_eq!(h.status, "ok");
    }

    #[test]
    fn envelope_serializes_without_empty_fields() {
        let ok = types::ApiResponse::ok(42);
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"], 42);
        assert!(v.get("error").is_none());

        let err = types::ApiResponse::<()>::error("boom");
        let v = serde_json::to_value(&err).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"], "boom");
        assert!(v.get("data").is_none());
    }
}
