// ============================================================================
// Environment Configuration Tests
// ============================================================================
//
// These mutate process environment variables, so they run serially.
//
// ============================================================================

use genosentinel::config::{ClinicalConfig, GatewayConfig, GenomicsConfig, StorageBackend};
use serial_test::serial;

const GATEWAY_VARS: [&str; 7] = [
    "AUTH_USER",
    "AUTH_PASSWORD",
    "JWT_SECRET",
    "GATEWAY_ROUTES",
    "UPSTREAM_TIMEOUT_SECS",
    "ACCESS_TOKEN_TTL_HOURS",
    "PORT",
];

fn clear(vars: &[&str]) {
    for var in vars {
        std::env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_gateway_requires_credentials() {
    clear(&GATEWAY_VARS);
    std::env::set_var("JWT_SECRET", "test-secret-that-is-at-least-32-bytes-long");

    assert!(GatewayConfig::from_env().is_err());

    std::env::set_var("AUTH_USER", "admin");
    std::env::set_var("AUTH_PASSWORD", "  ");
    assert!(GatewayConfig::from_env().is_err());

    clear(&GATEWAY_VARS);
}

#[test]
#[serial]
fn test_gateway_config_from_env() {
    clear(&GATEWAY_VARS);
    std::env::set_var("AUTH_USER", "admin");
    std::env::set_var("AUTH_PASSWORD", "pw");
    std::env::set_var("JWT_SECRET", "test-secret-that-is-at-least-32-bytes-long");
    std::env::set_var("GATEWAY_ROUTES", "/genoma=http://genomics:8000/, /clinica=http://clinic:3000");
    std::env::set_var("UPSTREAM_TIMEOUT_SECS", "15");
    std::env::set_var("PORT", "9090");

    let config = GatewayConfig::from_env().unwrap();
    assert_eq!(config.port, 9090);
    assert_eq!(config.upstream_timeout_secs, Some(15));
    assert_eq!(
        config.routes,
        vec![
            ("/genoma".to_string(), "http://genomics:8000".to_string()),
            ("/clinica".to_string(), "http://clinic:3000".to_string()),
        ]
    );
    assert!(config.auth.verify("admin", "pw"));

    std::env::set_var("UPSTREAM_TIMEOUT_SECS", "soon");
    assert!(GatewayConfig::from_env().is_err());

    clear(&GATEWAY_VARS);
}

#[test]
#[serial]
fn test_gateway_defaults() {
    clear(&GATEWAY_VARS);
    std::env::set_var("AUTH_USER", "admin");
    std::env::set_var("AUTH_PASSWORD", "pw");

    let config = GatewayConfig::from_env().unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.upstream_timeout_secs, None);
    assert_eq!(config.jwt.access_token_ttl_hours, 1);
    assert_eq!(config.routes[0].0, "/clinica");
    assert_eq!(config.routes[1].0, "/genoma");

    clear(&GATEWAY_VARS);
}

#[test]
#[serial]
fn test_memory_backend_skips_database_config() {
    clear(&["DATABASE_URL", "DB_HOST", "PORT", "CLINIC_SERVICE_URL"]);
    std::env::set_var("STORAGE_BACKEND", "memory");

    let clinical = ClinicalConfig::from_env().unwrap();
    assert_eq!(clinical.storage, StorageBackend::Memory);
    assert!(clinical.database.is_none());
    assert_eq!(clinical.port, 3000);

    let genomics = GenomicsConfig::from_env().unwrap();
    assert!(genomics.database.is_none());
    assert_eq!(genomics.port, 8000);
    assert_eq!(genomics.clinic_service_url, "http://localhost:3000/clinica");

    std::env::set_var("CLINIC_SERVICE_URL", "http://clinic:3000/clinica/");
    let genomics = GenomicsConfig::from_env().unwrap();
    assert_eq!(genomics.clinic_service_url, "http://clinic:3000/clinica");

    clear(&["STORAGE_BACKEND", "CLINIC_SERVICE_URL"]);
}
