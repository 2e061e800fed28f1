use async_trait::async_trait;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

/// Sends plain text emails through Amazon SES
#[derive(Clone)]
pub struct SesMailHandler {
    pub client: aws_sdk_sesv2::Client,
    pub from_email: String,
}

#[async_trait]
impl crate::services::MailService for SesMailHandler {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        let subject = Content::builder()
            .data(subject.trim())
            .charset("UTF-8")
            .build()?;
        let body = Content::builder().data(body).charset("UTF-8").build()?;

        let message = Message::builder()
            .subject(subject)
            .body(Body::builder().text(body).build())
            .build();

        self.client
            .send_email()
            .from_email_address(&self.from_email)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        Ok(())
    }
}
