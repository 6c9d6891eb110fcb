use crate::stats::StatsSummary;

pub const DEFAULT_GREETING: &str = "きなのがチャンネルを紹介するやんね！";

/// Inputs for one introduction message.
pub struct Introduction<'a> {
    pub greeting: &'a str,
    pub full_path: &'a str,
    pub topic: Option<&'a str>,
    pub stats: &'a StatsSummary,
    /// Oldest first; omitted from the body when empty.
    pub recent_message_ids: &'a [String],
    pub permalink_base: &'a str,
}

/// Quote every line of a non-empty topic, ending with a newline.
pub fn quote_topic(topic: &str) -> String {
    if topic.is_empty() {
        return String::new();
    }
    format!("> {}\n", topic.replace('\n', "\n> "))
}

pub fn permalink(base: &str, message_id: &str) -> String {
    format!("{}/messages/{message_id}", base.trim_end_matches('/'))
}

pub fn compose(intro: &Introduction<'_>) -> String {
    let topic = quote_topic(intro.topic.unwrap_or_default());
    let stats = intro.stats;
    let mut body = format!(
        "{greeting}
## {path}
{topic}
|説明|数|
|:-|:-|
|メンバー数|{subs}|
|総メッセージ数|{msgs}|
|会話に参加したユーザー数|{talkers}|
|ピン止め数|{pins}|",
        greeting = intro.greeting,
        path = intro.full_path,
        subs = stats.subscribers,
        msgs = stats.messages,
        talkers = stats.talkers,
        pins = stats.pins,
    );

    if !intro.recent_message_ids.is_empty() {
        let links: Vec<String> = intro
            .recent_message_ids
            .iter()
            .map(|id| permalink(intro.permalink_base, id))
            .collect();
        body.push_str("\n\n直近のメッセージ\n\n");
        body.push_str(&links.join("\n"));
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> StatsSummary {
        StatsSummary {
            subscribers: "5人 :@alice:".into(),
            messages: "120件".into(),
            talkers: "1人 :@alice:".into(),
            pins: "2件".into(),
        }
    }

    #[test]
    fn test_compose_full_message() {
        let stats = stats();
        let ids = vec!["m1".to_string(), "m2".to_string(), "m3".to_string()];
        let body = compose(&Introduction {
            greeting: DEFAULT_GREETING,
            full_path: "#gps/times/alice",
            topic: Some("line one\nline two"),
            stats: &stats,
            recent_message_ids: &ids,
            permalink_base: "https://q.trap.jp/",
        });

        let expected = "きなのがチャンネルを紹介するやんね！
## #gps/times/alice
> line one
> line two

|説明|数|
|:-|:-|
|メンバー数|5人 :@alice:|
|総メッセージ数|120件|
|会話に参加したユーザー数|1人 :@alice:|
|ピン止め数|2件|

直近のメッセージ

https://q.trap.jp/messages/m1
https://q.trap.jp/messages/m2
https://q.trap.jp/messages/m3";
        assert_eq!(body, expected);
    }

    #[test]
    fn test_compose_without_topic_or_messages() {
        let stats = stats();
        let body = compose(&Introduction {
            greeting: "hello",
            full_path: "#general",
            topic: None,
            stats: &stats,
            recent_message_ids: &[],
            permalink_base: "https://q.trap.jp",
        });
        assert!(body.starts_with("hello\n## #general\n\n|説明|数|"));
        assert!(body.ends_with("|ピン止め数|2件|"));
        assert!(!body.contains("直近のメッセージ"));
        assert!(!body.contains('>'));
    }

    #[test]
    fn test_table_has_four_data_rows() {
        let stats = stats();
        let body = compose(&Introduction {
            greeting: DEFAULT_GREETING,
            full_path: "#a",
            topic: Some(""),
            stats: &stats,
            recent_message_ids: &[],
            permalink_base: "https://q.trap.jp",
        });
        let rows: Vec<&str> = body.lines().filter(|l| l.starts_with('|')).collect();
        // header, alignment, then data
        assert_eq!(rows.len(), 6);
        assert!(rows[2..].iter().all(|r| r.matches('|').count() == 3));
        assert!(body.contains("|5人 :@alice:|"));
        assert!(body.contains("|120件|"));
    }

    #[test]
    fn test_quote_topic() {
        assert_eq!(quote_topic(""), "");
        assert_eq!(quote_topic("hi"), "> hi\n");
        assert_eq!(quote_topic("a\nb"), "> a\n> b\n");
    }
}
