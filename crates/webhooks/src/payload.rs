use serde::{Deserialize, Serialize};

use courier_transport::{GroupInfo, InboundMessage, MediaInfo};

/// JSON body POSTed to every subscriber.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub account_id: String,
    pub message_id: String,
    pub from: String,
    pub to: String,
    pub body: String,
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupInfo>,
}

impl MessagePayload {
    #[must_use]
    pub fn from_inbound(account_id: &str, message: &InboundMessage) -> Self {
        Self {
            account_id: account_id.to_string(),
            message_id: message.id.clone(),
            from: message.from.clone(),
            to: message.to.clone(),
            body: message.body.clone(),
            timestamp: message.timestamp,
            media: message.media.clone(),
            group: message.group.clone(),
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn inbound() -> InboundMessage {
        InboundMessage {
            id: "msg-1".into(),
            from: "+15550001@c.us".into(),
            to: "+15550002@c.us".into(),
            body: "hi".into(),
            timestamp: 1700000000,
            media: None,
            group: None,
        }
    }

    #[test]
    fn wire_shape_omits_absent_metadata() {
        let payload = MessagePayload::from_inbound("acc-1", &inbound());
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["account_id"], "acc-1");
        assert_eq!(json["message_id"], "msg-1");
        assert_eq!(json["body"], "hi");
        assert!(json.get("media").is_none());
        assert!(json.get("group").is_none());
    }

    #[test]
    fn wire_shape_carries_media_and_group() {
        let mut message = inbound();
        message.media = Some(MediaInfo {
            mime_type: "image/jpeg".into(),
            filename: Some("photo.jpg".into()),
            size_bytes: Some(2048),
        });
        message.group = Some(GroupInfo {
            group_id: "grp-9".into(),
            subject: Some("ops".into()),
            participant: Some("+15550003@c.us".into()),
        });

        let json = serde_json::to_value(MessagePayload::from_inbound("acc-1", &message)).unwrap();
        assert_eq!(json["media"]["mime_type"], "image/jpeg");
        assert_eq!(json["group"]["group_id"], "grp-9");
    }
}
