//! Activation email delivery.
//!
//! The identity service only sees [`EmailSender`]. Production uses
//! [`SmtpEmailSender`], which renders a localized HTML message and relays it
//! over STARTTLS.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use url::Url;

use crate::auth::tokens;
use crate::config::Config;

const APP_NAME: &str = "Kkal Tracker";

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("invalid app url: {0}")]
    AppUrl(#[from] url::ParseError),
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send the activation link for `raw_token` to `to`, in `language`.
    async fn send_activation_email(
        &self,
        to: &str,
        raw_token: &str,
        language: &str,
    ) -> Result<(), EmailError>;
}

pub struct SmtpEmailSender {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    app_url: Url,
    link_ttl_hours: i64,
}

impl SmtpEmailSender {
    pub fn from_config(config: &Config) -> Result<Self, EmailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .timeout(Some(config.email_timeout()));

        if !config.smtp_user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.smtp_from.parse()?,
            app_url: Url::parse(&config.app_url)?,
            link_ttl_hours: config.activation_token_ttl_hours,
        })
    }
}

#[async_trait]
impl EmailSender for SmtpEmailSender {
    async fn send_activation_email(
        &self,
        to: &str,
        raw_token: &str,
        language: &str,
    ) -> Result<(), EmailError> {
        tracing::debug!(to, language, token = %tokens::preview(raw_token), "sending activation email");

        let link = activation_link(&self.app_url, raw_token);
        let (subject, body) = render_activation_email(language, &link, self.link_ttl_hours);

        let message = Message::builder()
            .from(self.from.clone())
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(body)?;

        self.transport.send(message).await?;

        tracing::info!(to, "activation email sent");
        Ok(())
    }
}

/// `{app_url}/activate/{token}`, tolerant of a trailing slash on `app_url`.
pub fn activation_link(app_url: &Url, raw_token: &str) -> String {
    format!(
        "{}/activate/{}",
        app_url.as_str().trim_end_matches('/'),
        raw_token
    )
}

struct ActivationCopy {
    subject: &'static str,
    heading: &'static str,
    intro: &'static str,
    button: &'static str,
    copy_hint: &'static str,
    expiry: &'static str,
    ignore: &'static str,
}

const EN_US: ActivationCopy = ActivationCopy {
    subject: "Account Activation - Kkal Tracker",
    heading: "Welcome to",
    intro: "Thank you for registering! To activate your account, please click the button below:",
    button: "Activate Account",
    copy_hint: "Or copy and paste this link into your browser:",
    expiry: "This activation link will expire in {hours} hours.",
    ignore: "If you didn't register for this account, please ignore this email.",
};

const UK_UA: ActivationCopy = ActivationCopy {
    subject: "Активація облікового запису - Kkal Tracker",
    heading: "Ласкаво просимо до",
    intro: "Дякуємо за реєстрацію! Щоб активувати свій обліковий запис, натисніть кнопку нижче:",
    button: "Активувати обліковий запис",
    copy_hint: "Або скопіюйте та вставте це посилання у ваш браузер:",
    expiry: "Це посилання для активації дійсне {hours} год.",
    ignore: "Якщо ви не реєструвалися, просто ігноруйте цей лист.",
};

const RU_UA: ActivationCopy = ActivationCopy {
    subject: "Активация учетной записи - Kkal Tracker",
    heading: "Добро пожаловать в",
    intro: "Спасибо за регистрацию! Чтобы активировать свою учетную запись, нажмите кнопку ниже:",
    button: "Активировать учетную запись",
    copy_hint: "Или скопируйте и вставьте эту ссылку в ваш браузер:",
    expiry: "Эта ссылка для активации действительна {hours} ч.",
    ignore: "Если вы не регистрировались, просто проигнорируйте это письмо.",
};

fn copy_for(language: &str) -> &'static ActivationCopy {
    match language {
        "uk_UA" => &UK_UA,
        "ru_UA" => &RU_UA,
        _ => &EN_US,
    }
}

/// Subject and HTML body for an activation email. Unknown languages fall
/// back to English. `ttl_hours` is how long the link stays valid.
pub fn render_activation_email(language: &str, link: &str, ttl_hours: i64) -> (String, String) {
    let copy = copy_for(language);
    let expiry = copy.expiry.replace("{hours}", &ttl_hours.to_string());

    let body = format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="UTF-8"><title>{subject}</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
  <div style="background-color: #f8f9fa; padding: 20px; border-radius: 8px;">
    <h1 style="color: #3b82f6;">{heading} {app}!</h1>
    <p>{intro}</p>
    <p style="text-align: center; margin: 30px 0;">
      <a href="{link}" style="background-color: #3b82f6; color: white; padding: 12px 30px; text-decoration: none; border-radius: 6px; font-weight: bold;">{button}</a>
    </p>
    <p>{copy_hint}</p>
    <p style="word-break: break-all;"><a href="{link}">{link}</a></p>
    <p style="color: #6b7280; font-size: 14px;">{expiry}<br>{ignore}</p>
  </div>
</body>
</html>
"#,
        subject = copy.subject,
        heading = copy.heading,
        app = APP_NAME,
        intro = copy.intro,
        button = copy.button,
        copy_hint = copy.copy_hint,
        expiry = expiry,
        ignore = copy.ignore,
        link = link,
    );

    (copy.subject.to_string(), body)
}

#[cfg(test)]
pub mod testing {
    //! Scriptable sender for service and router tests.

    use std::sync::Mutex;
    use std::time::Duration;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Mode {
        Succeed,
        Fail,
        Hang,
    }

    #[derive(Debug, Clone)]
    pub struct SentEmail {
        pub to: String,
        pub token: String,
        pub language: String,
    }

    pub struct RecordingEmailSender {
        mode: Mutex<Mode>,
        sent: Mutex<Vec<SentEmail>>,
    }

    impl RecordingEmailSender {
        pub fn new(mode: Mode) -> Self {
            Self {
                mode: Mutex::new(mode),
                sent: Mutex::new(Vec::new()),
            }
        }

        pub fn set_mode(&self, mode: Mode) {
            *self.mode.lock().unwrap() = mode;
        }

        pub fn sent(&self) -> Vec<SentEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl EmailSender for RecordingEmailSender {
        async fn send_activation_email(
            &self,
            to: &str,
            raw_token: &str,
            language: &str,
        ) -> Result<(), EmailError> {
            let mode = *self.mode.lock().unwrap();
            match mode {
                Mode::Succeed => {
                    self.sent.lock().unwrap().push(SentEmail {
                        to: to.to_string(),
                        token: raw_token.to_string(),
                        language: language.to_string(),
                    });
                    Ok(())
                }
                Mode::Fail => Err("relay down".parse::<Mailbox>().unwrap_err().into()),
                Mode::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            }
        }
    }
}
