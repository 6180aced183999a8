use serde_json::{json, Value};

use shared_config::{AppConfig, StorageBackend};

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the Supabase backend at a mock server.
    pub fn with_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        let mut config = AppConfig::in_memory();
        config.supabase_url = self.supabase_url.clone();
        config.supabase_anon_key = self.supabase_anon_key.clone();
        config.storage_backend = StorageBackend::Supabase;
        config
    }
}

/// PostgREST-shaped rows for wiremock stubs.
pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_row(id: i64, name: &str, phone_number: &str) -> Value {
        json!({
            "id": id,
            "name": name,
            "phone_number": phone_number
        })
    }

    pub fn open_slot_row(id: i64, starting_time: &str) -> Value {
        json!({
            "id": id,
            "starting_time": starting_time,
            "patient": null
        })
    }

    pub fn claimed_slot_row(id: i64, starting_time: &str, name: &str, phone_number: &str) -> Value {
        json!({
            "id": id,
            "starting_time": starting_time,
            "patient": {
                "name": name,
                "phone_number": phone_number
            }
        })
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert_eq!(app_config.storage_backend, StorageBackend::Supabase);
        assert!(app_config.is_configured());
    }

    #[test]
    fn claimed_row_nests_patient() {
        let row = MockSupabaseResponses::claimed_slot_row(3, "2022-06-05T17:30:00", "Kevin", "123");
        assert_eq!(row["patient"]["phone_number"], "123");
        assert!(MockSupabaseResponses::open_slot_row(1, "2022-06-05T17:30:00")["patient"].is_null());
    }
}
