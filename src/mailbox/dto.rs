use serde::{Deserialize, Serialize};

/// Request body for writing a note into another user's store.
#[derive(Debug, Deserialize)]
pub struct WriteRequest {
    pub content: Option<String>,
}

/// Echo of a freshly written note.
#[derive(Debug, Serialize)]
pub struct WrittenMemo {
    pub memo_id: i64,
    pub writer_id: i64,
    pub content: String,
    #[serde(rename = "choiceType")]
    pub choice_type: String,
}

/// A note as returned from the read endpoint.
#[derive(Debug, Serialize)]
pub struct MemoView {
    #[serde(rename = "postID")]
    pub post_id: i64,
    pub writer: i64,
    pub content: String,
    #[serde(rename = "choiceType")]
    pub choice_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_memo_uses_wire_field_names() {
        let memo = WrittenMemo {
            memo_id: 1,
            writer_id: 2,
            content: "hi".into(),
            choice_type: "A".into(),
        };
        let json = serde_json::to_string(&memo).unwrap();
        assert!(json.contains("\"memo_id\":1"));
        assert!(json.contains("\"choiceType\":\"A\""));
    }

    #[test]
    fn memo_view_uses_wire_field_names() {
        let view = MemoView {
            post_id: 3,
            writer: 2,
            content: "hi".into(),
            choice_type: "A".into(),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"postID\":3"));
        assert!(json.contains("\"writer\":2"));
    }

    #[test]
    fn write_request_tolerates_missing_content() {
        let req: WriteRequest = serde_json::from_str("{}").unwrap();
        assert!(req.content.is_none());
    }
}
