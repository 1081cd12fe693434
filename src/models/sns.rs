use serde::Deserialize;

/// Inbound SNS payload. Every field SNS might send that this relay cares
/// about is explicitly optional; presence is checked in the handler's
/// validation cascade rather than through dynamic field lookups.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnsMessage {
    #[serde(rename = "TopicArn")]
    pub topic_arn: Option<String>,
    #[serde(rename = "SubscribeURL")]
    pub subscribe_url: Option<String>,
    #[serde(rename = "Subject")]
    pub subject: Option<String>,
    #[serde(rename = "Message")]
    pub message: Option<String>,
}

impl SnsMessage {
    pub fn is_for_topic(&self, topic_arn: &str) -> bool {
        self.topic_arn.as_deref() == Some(topic_arn)
    }

    /// Render the notification as Signal-flavored text: bolded subject,
    /// blank line, message body.
    pub fn notification_text(subject: &str, message: &str) -> String {
        format!("**{}**\n\n{}", subject, message)
    }
}
