//! Pieces shared by every service binary: logging setup and small wire types.

pub mod types;
pub mod utils;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok("user-service");
        assert_eq!(h.status, "ok");
        assert_eq!(h.service, "user-service");
    }

    #[test]
    fn error_body_serializes_message() {
        let body = types::ErrorBody::new("no community with ID 7");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"], "no community with ID 7");
    }
}
