use netowork_auth::config::{Config, SmtpConfig};
use netowork_auth::{App, BootstrapError};

fn smtp() -> SmtpConfig {
    SmtpConfig {
        host: "smtp.example.com".to_string(),
        port: 587,
        username: "mailer".to_string(),
        password: "secret".to_string(),
        sender: "noreply@example.com".to_string(),
    }
}

#[tokio::test]
async fn test_from_config_without_smtp_uses_log_notifier() {
    let app = App::from_config(Config::test())
        .await
        .expect("no SMTP_HOST means emails are only logged");
    assert_eq!(app.config.environment, "test");
}

#[cfg(not(feature = "smtp"))]
#[tokio::test]
async fn test_smtp_configured_without_feature_fails_startup() {
    let mut config = Config::test();
    config.smtp = Some(smtp());

    match App::from_config(config).await {
        Err(BootstrapError::Notifier(e)) => {
            assert!(e.to_string().contains("smtp feature is disabled"));
        }
        Err(e) => panic!("unexpected bootstrap error: {e}"),
        Ok(_) => panic!("startup must fail when SMTP cannot be used"),
    }
}

#[cfg(feature = "smtp")]
#[tokio::test]
async fn test_smtp_rejects_invalid_sender() {
    let mut config = Config::test();
    config.smtp = Some(SmtpConfig {
        sender: "not an address".to_string(),
        ..smtp()
    });

    assert!(matches!(
        App::from_config(config).await,
        Err(BootstrapError::Notifier(_))
    ));
}
