use lapin::uri::{AMQPAuthority, AMQPUri, AMQPUserInfo};

#[derive(Clone, Debug)]
pub struct RabbitMqOptions {
    pub username: String,
    pub password: String,
    pub hostname: String,
    pub port: u16,
    pub vhost: String,
}

impl Default for RabbitMqOptions {
    fn default() -> Self {
        Self {
            username: "guest".into(),
            password: "guest".into(),
            hostname: "localhost".into(),
            port: 5672,
            vhost: "/".into(),
        }
    }
}

impl RabbitMqOptions {
    /// Built field by field so credentials never need escaping.
    pub fn amqp_uri(&self) -> AMQPUri {
        AMQPUri {
            authority: AMQPAuthority {
                userinfo: AMQPUserInfo {
                    username: self.username.clone(),
                    password: self.password.clone(),
                },
                host: self.hostname.clone(),
                port: self.port,
            },
            vhost: self.vhost.clone(),
            ..Default::default()
        }
    }

    /// Where we connect, without credentials. Safe to log.
    pub fn endpoint(&self) -> String {
        format!("amqp://{}:{}/{}", self.hostname, self.port, self.vhost.trim_start_matches('/'))
    }
}

/// Connection name shown in the broker's management UI.
pub fn connection_name(role: &str) -> String {
    format!("scoop-{role}")
}
