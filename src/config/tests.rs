use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::time::Duration;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_evaluator_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("EVALUATOR_PORT");
        env::remove_var("EVALUATOR_BIND_ADDR");
        env::remove_var("OLLAMA_URL");
        env::remove_var("OLLAMA_MODEL");
        env::remove_var("OLLAMA_TIMEOUT");
        env::remove_var("MIN_CONTENT_LENGTH");
        env::remove_var("MIN_QUALITY_SCORE");
        env::remove_var("MAX_AD_RATIO");
        env::remove_var("EVALUATION_CACHE_TTL");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8000);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.ollama_url, "http://localhost:11434");
    assert_eq!(config.ollama_model, "llama3.1:8b-instruct-q4_K_M");
    assert_eq!(config.request_timeout, Duration::from_secs(60));
    assert_eq!(config.rubric.min_content_length, 100);
    assert_eq!(config.rubric.min_quality_score, 0.6);
    assert_eq!(config.rubric.max_ad_ratio, 0.3);
    assert_eq!(config.cache_ttl, Duration::from_secs(3600));
    assert!(config.validate().is_ok());
}

#[test]
fn test_socket_addr() {
    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_socket_addr_brackets_ipv6() {
    let config = Config {
        port: 8000,
        bind_addr: "::1".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "[::1]:8000");
}

#[test]
fn test_health_check_url_follows_bind_addr() {
    let specific = Config {
        port: 9001,
        bind_addr: "10.1.2.3".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(specific.health_check_url(), "http://10.1.2.3:9001/healthz");

    let wildcard = Config {
        port: 9001,
        bind_addr: "0.0.0.0".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(wildcard.health_check_url(), "http://127.0.0.1:9001/healthz");

    let wildcard_v6 = Config {
        port: 9001,
        bind_addr: "::".parse().unwrap(),
        ..Default::default()
    };
    assert_eq!(wildcard_v6.health_check_url(), "http://[::1]:9001/healthz");
}

#[test]
#[serial]
fn test_health_check_url_from_env() {
    clear_evaluator_env();
    let config = with_env_vars(
        &[("EVALUATOR_BIND_ADDR", "192.168.5.7"), ("EVALUATOR_PORT", "8100")],
        || Config::from_env().unwrap(),
    );
    assert_eq!(config.health_check_url(), "http://192.168.5.7:8100/healthz");
}

#[test]
fn test_rubric_debug_is_redacted() {
    let rubric = Rubric {
        min_content_length: 4242,
        min_quality_score: 0.4242,
        max_ad_ratio: 0.1717,
    };

    let rendered = format!("{:?}", rubric);
    assert!(!rendered.contains("4242"));
    assert!(!rendered.contains("1717"));

    let config = Config {
        rubric,
        ..Default::default()
    };
    let rendered = format!("{:?}", config);
    assert!(!rendered.contains("4242"));
    assert!(!rendered.contains("1717"));
}

#[test]
fn test_rubric_is_useful_boundary() {
    let rubric = Rubric::default();
    assert!(rubric.is_useful(0.6));
    assert!(rubric.is_useful(1.0));
    assert!(!rubric.is_useful(0.59));
    assert!(!rubric.is_useful(0.0));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_evaluator_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8000);
    assert_eq!(config.ollama_url, "http://localhost:11434");
    assert_eq!(config.request_timeout, Duration::from_secs(60));
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_evaluator_env();

    with_env_vars(
        &[
            ("OLLAMA_URL", "http://ollama:11434"),
            ("OLLAMA_MODEL", "llama3.1:test"),
            ("OLLAMA_TIMEOUT", "15"),
            ("MIN_CONTENT_LENGTH", "250"),
            ("MIN_QUALITY_SCORE", "0.75"),
            ("MAX_AD_RATIO", "0.2"),
            ("EVALUATION_CACHE_TTL", "60"),
            ("EVALUATOR_PORT", "9100"),
            ("EVALUATOR_BIND_ADDR", "0.0.0.0"),
        ],
        || {
            let config = Config::from_env().expect("should parse");
            assert_eq!(config.ollama_url, "http://ollama:11434");
            assert_eq!(config.ollama_model, "llama3.1:test");
            assert_eq!(config.request_timeout, Duration::from_secs(15));
            assert_eq!(config.rubric.min_content_length, 250);
            assert_eq!(config.rubric.min_quality_score, 0.75);
            assert_eq!(config.rubric.max_ad_ratio, 0.2);
            assert_eq!(config.cache_ttl, Duration::from_secs(60));
            assert_eq!(config.port, 9100);
            assert_eq!(
                config.bind_addr,
                IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
            );
            assert!(config.validate().is_ok());
        },
    );
}

#[test]
#[serial]
fn test_from_env_non_numeric_timeout_fails() {
    clear_evaluator_env();

    with_env_vars(&[("OLLAMA_TIMEOUT", "soon")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::IntParseError {
                name: "OLLAMA_TIMEOUT",
                ..
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_non_numeric_quality_score_fails() {
    clear_evaluator_env();

    with_env_vars(&[("MIN_QUALITY_SCORE", "high")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::FloatParseError {
                name: "MIN_QUALITY_SCORE",
                ..
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_negative_content_length_fails() {
    clear_evaluator_env();

    with_env_vars(&[("MIN_CONTENT_LENGTH", "-5")], || {
        assert!(Config::from_env().is_err());
    });
}

#[test]
#[serial]
fn test_from_env_nan_ratio_fails() {
    clear_evaluator_env();

    with_env_vars(&[("MAX_AD_RATIO", "NaN")], || {
        let result = Config::from_env();
        assert!(matches!(
            result,
            Err(ConfigError::OutOfUnitRange {
                name: "MAX_AD_RATIO"
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_out_of_range_score_fails_validation() {
    clear_evaluator_env();

    with_env_vars(&[("MIN_QUALITY_SCORE", "1.5")], || {
        let config = Config::from_env().expect("parses as a float");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfUnitRange {
                name: "MIN_QUALITY_SCORE"
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_empty_model_fails() {
    clear_evaluator_env();

    with_env_vars(&[("OLLAMA_MODEL", "   ")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::Empty {
                name: "OLLAMA_MODEL"
            })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_port() {
    clear_evaluator_env();

    with_env_vars(&[("EVALUATOR_PORT", "0")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidPort { .. })
        ));
    });

    with_env_vars(&[("EVALUATOR_PORT", "70000")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::PortParseError { .. })
        ));
    });
}

#[test]
#[serial]
fn test_from_env_invalid_bind_addr() {
    clear_evaluator_env();

    with_env_vars(&[("EVALUATOR_BIND_ADDR", "not-an-ip")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidBindAddr { .. })
        ));
    });
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let config = Config {
        request_timeout: Duration::ZERO,
        ..Default::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::ZeroTimeout)));
}

#[test]
fn test_validate_rejects_bad_urls() {
    let config = Config {
        ollama_url: "not a url".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl { .. })
    ));

    let config = Config {
        ollama_url: "ftp://models.local".to_string(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidUrl { .. })
    ));
}

#[test]
fn test_validate_rejects_ad_ratio_out_of_range() {
    let config = Config {
        rubric: Rubric {
            max_ad_ratio: -0.1,
            ..Rubric::default()
        },
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::OutOfUnitRange {
            name: "MAX_AD_RATIO"
        })
    ));
}

#[test]
fn test_out_of_range_error_does_not_echo_value() {
    let config = Config {
        rubric: Rubric {
            min_quality_score: 1.2345,
            ..Rubric::default()
        },
        ..Default::default()
    };
    let err = config.validate().unwrap_err();
    assert!(!err.to_string().contains("1.2345"));
}
