use std::fmt;

/// An issue entry scraped from the repository's issue listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub id: String,
    pub url: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebhookKind {
    Discord,
    GoogleChat,
}

impl WebhookKind {
    /// JSON field the message text is sent under.
    pub fn payload_field(&self) -> &'static str {
        match self {
            WebhookKind::Discord => "content",
            WebhookKind::GoogleChat => "text",
        }
    }

    /// The only status code the platform returns for an accepted message.
    pub fn success_status(&self) -> u16 {
        match self {
            WebhookKind::Discord => 204,
            WebhookKind::GoogleChat => 200,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WebhookKind::Discord => "Discord",
            WebhookKind::GoogleChat => "Google Chat",
        }
    }
}

impl fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookTarget {
    pub kind: WebhookKind,
    pub url: String,
}

impl WebhookTarget {
    pub fn new(kind: WebhookKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
        }
    }
}
