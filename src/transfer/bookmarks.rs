/// Netscape bookmark files, the HTML format browsers import and export.
///
/// Parsing is a small tag scanner rather than a DOM: each `<DL>` is a list,
/// a `<DL>` that directly follows an `<H3>` is that folder's list, and each
/// `<A HREF>` belongs to the innermost open list. Folders become groups; the
/// loose lists are only used when the file has no folders at all.

use super::{ParsedGroup, parse_display_time};
use crate::settings::{PLACEHOLDER_URL, UNTITLED_TAB};
use crate::tab_data::{Group, TabRecord};
use regex::Regex;
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9]*)([^>]*)>").unwrap());

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#).unwrap()
});

static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").unwrap());

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn unescape(text: &str) -> String {
    ENTITY
        .replace_all(text, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                    u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32)
                }
                _ if entity.starts_with('#') => {
                    entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                }
                _ => None,
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

/// `now` stamps LAST_MODIFIED and stands in for unparseable creation times
pub fn export(groups: &[Group], now: i64) -> String {
    let mut html = String::from(
        "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n\
         <META HTTP-EQUIV=\"Content-Type\" CONTENT=\"text/html; charset=UTF-8\">\n\
         <TITLE>Tab Shelf export</TITLE>\n\
         <H1>Tab Shelf export</H1>\n\
         <DL><p>\n",
    );

    for group in groups {
        let added = parse_display_time(&group.create_time).unwrap_or(now);
        html.push_str(&format!(
            "    <DT><H3 ADD_DATE=\"{}\" LAST_MODIFIED=\"{}\">{}</H3>\n    <DL><p>\n",
            added,
            now,
            escape(&group.display_name())
        ));
        for tab in &group.tabs {
            let url = if tab.url.is_empty() { PLACEHOLDER_URL } else { &tab.url };
            let title = if tab.title.is_empty() { UNTITLED_TAB } else { &tab.title };
            let icon = if tab.fav_icon_url.is_empty() {
                String::new()
            } else {
                format!(" ICON=\"{}\"", escape(&tab.fav_icon_url))
            };
            html.push_str(&format!(
                "        <DT><A HREF=\"{}\" ADD_DATE=\"{}\"{}>{}</A>\n",
                escape(url),
                added,
                icon,
                escape(title)
            ));
        }
        html.push_str("    </DL><p>\n");
    }

    html.push_str("</DL><p>\n");
    html
}

/// Which list an open `<DL>` appends to
#[derive(Debug, Clone, Copy)]
enum List {
    Folder(usize),
    Loose(usize),
}

#[derive(Debug)]
enum Capture {
    Heading(String),
    Link { href: String, icon: String, text: String },
}

#[derive(Default)]
struct Scanner {
    folders: Vec<ParsedGroup>,
    loose: Vec<ParsedGroup>,
    open: Vec<List>,
    capture: Option<Capture>,
    /// Name of the folder whose `<DL>` is expected next
    heading: Option<String>,
}

impl Scanner {
    fn open_list(&mut self) {
        let list = match self.heading.take() {
            Some(name) => {
                self.folders.push(ParsedGroup {
                    name: Some(name),
                    ..ParsedGroup::default()
                });
                List::Folder(self.folders.len() - 1)
            }
            None => {
                self.loose.push(ParsedGroup::default());
                List::Loose(self.loose.len() - 1)
            }
        };
        self.open.push(list);
    }

    fn add_tab(&mut self, tab: TabRecord) {
        if self.open.is_empty() {
            self.open_list();
        }
        let target = match self.open.last() {
            Some(List::Folder(i)) => self.folders.get_mut(*i),
            Some(List::Loose(i)) => self.loose.get_mut(*i),
            None => None,
        };
        if let Some(group) = target {
            group.tabs.push(tab);
        }
    }

    fn text(&mut self, text: &str) {
        match &mut self.capture {
            Some(Capture::Heading(buf)) | Some(Capture::Link { text: buf, .. }) => {
                buf.push_str(text)
            }
            None => {}
        }
    }

    fn tag(&mut self, closing: bool, name: &str, attributes: &str) {
        match (closing, name.to_ascii_uppercase().as_str()) {
            (false, "DL") => self.open_list(),
            (true, "DL") => {
                self.open.pop();
            }
            (false, "H3") => {
                self.heading = None;
                self.capture = Some(Capture::Heading(String::new()));
            }
            (true, "H3") => {
                if let Some(Capture::Heading(name)) = self.capture.take() {
                    self.heading = Some(unescape(name.trim()));
                }
            }
            (false, "A") => {
                let mut href = None;
                let mut icon = String::new();
                for caps in ATTRIBUTE.captures_iter(attributes) {
                    let value = caps
                        .get(2)
                        .or_else(|| caps.get(3))
                        .or_else(|| caps.get(4))
                        .map_or("", |m| m.as_str());
                    match caps[1].to_ascii_uppercase().as_str() {
                        "HREF" => href = Some(unescape(value)),
                        "ICON" => icon = unescape(value),
                        _ => {}
                    }
                }
                // anchors without HREF are not bookmarks
                self.capture = href.map(|href| Capture::Link {
                    href,
                    icon,
                    text: String::new(),
                });
            }
            (true, "A") => {
                if let Some(Capture::Link { href, icon, text }) = self.capture.take() {
                    self.add_tab(TabRecord {
                        title: unescape(text.trim()),
                        url: href,
                        fav_icon_url: icon,
                    });
                }
            }
            _ => {}
        }
    }

    fn finish(self) -> Vec<ParsedGroup> {
        if self.folders.iter().any(|g| !g.tabs.is_empty()) {
            self.folders
        } else {
            self.loose
        }
    }
}

/// Reads every bookmark folder in `text`.
///
/// The scanner accepts what browsers write, not arbitrary HTML:
/// - a raw `>` inside a quoted attribute value ends the tag there, so the value
///   is cut short (exports escape it as `&gt;`)
/// - markup inside a link or folder title is dropped and only its text is kept
/// - an `<A>` left open is discarded when the next `<A>` starts
/// - `<script>`, `<style>` and CDATA sections get no special treatment
pub fn parse(text: &str) -> Vec<ParsedGroup> {
    let text = COMMENT.replace_all(text, "");
    let mut scanner = Scanner::default();
    let mut last = 0;

    for caps in TAG.captures_iter(&text) {
        let Some(whole) = caps.get(0) else { continue };
        scanner.text(&text[last..whole.start()]);
        scanner.tag(!caps[1].is_empty(), &caps[2], &caps[3]);
        last = whole.end();
    }
    scanner.text(&text[last..]);
    scanner.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_and_unescape() {
        let raw = r#"Tom & Jerry <"quoted"> it's"#;

        assert_eq!(
            escape(raw),
            "Tom &amp; Jerry &lt;&quot;quoted&quot;&gt; it&#39;s"
        );
        assert_eq!(unescape(&escape(raw)), raw);
        assert_eq!(unescape("&#x41;&#66;&unknown;"), "AB&unknown;");
    }

    #[test]
    fn test_export_header_and_dates() {
        let group = Group {
            id: "g".to_string(),
            create_time: "not a date".to_string(),
            custom_name: "A & B".to_string(),
            tabs: vec![TabRecord::new("T", "https://t.io?a=1&b=2", "")],
        };

        let html = export(&[group], 1_700_000_000);

        assert!(html.starts_with("<!DOCTYPE NETSCAPE-Bookmark-file-1>"));
        assert!(html.contains(">A &amp; B</H3>"));
        assert!(html.contains("HREF=\"https://t.io?a=1&amp;b=2\" ADD_DATE=\"1700000000\">T</A>"));
        assert!(!html.contains("ICON="));
    }

    #[test]
    fn test_parse_folders() {
        let html = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<!-- <DL><DT><A HREF="https://commented.out">no</A> -->
<DL><p>
    <DT><H3 ADD_DATE="1">News &amp; Blogs</H3>
    <DL><p>
        <DT><A HREF="https://a.io" ICON="data:image/png;base64,AAA">A site</A>
        <DT><a href='https://b.io'>  B  </a>
        <DT><H3>Nested</H3>
        <DL><p>
            <DT><A HREF="https://c.io">C</A>
        </DL><p>
        <DT><A HREF="https://d.io">D</A>
    </DL><p>
    <DT><A HREF="https://loose.io">Loose</A>
</DL><p>"#;

        let groups = parse(html);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name.as_deref(), Some("News & Blogs"));
        let urls: Vec<&str> = groups[0].tabs.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.io", "https://b.io", "https://d.io"]);
        assert_eq!(groups[0].tabs[0].fav_icon_url, "data:image/png;base64,AAA");
        assert_eq!(groups[0].tabs[1].title, "B");
        assert_eq!(groups[1].name.as_deref(), Some("Nested"));
        assert_eq!(groups[1].tabs[0].url, "https://c.io");
    }

    #[test]
    fn test_parse_flat_file_uses_loose_links() {
        let html = r#"<DL><p>
    <DT><A HREF="https://one.io">One</A>
    <DT><A>no href</A>
    <DT><A HREF="https://two.io">Two</A>
</DL>"#;

        let groups = parse(html);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, None);
        assert_eq!(groups[0].tabs.len(), 2);
    }

    #[test]
    fn test_parse_links_without_any_list() {
        let groups = parse(r#"<A HREF="https://x.io">X</A>"#);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tabs[0].title, "X");
    }

    #[test]
    fn test_parse_plain_text_yields_nothing_useful() {
        assert!(parse("hello world").iter().all(|g| g.tabs.is_empty()));
    }

    #[test]
    fn test_parse_keeps_text_of_markup_inside_titles() {
        let html = r#"<DT><H3>My <B>Reading</B></H3>
<DL><p>
    <DT><A HREF="https://r.io/?q=a&gt;b"><I>Long</I> read</A>
</DL>"#;

        let groups = parse(html);

        assert_eq!(groups[0].name.as_deref(), Some("My Reading"));
        assert_eq!(groups[0].tabs[0].title, "Long read");
        assert_eq!(groups[0].tabs[0].url, "https://r.io/?q=a>b");
    }

    #[test]
    fn test_parse_drops_anchor_left_open() {
        let groups = parse(r#"<DL><DT><A HREF="https://lost.io">Lost<DT><A HREF="https://kept.io">Kept</A></DL>"#);

        assert_eq!(groups[0].tabs.len(), 1);
        assert_eq!(groups[0].tabs[0].url, "https://kept.io");
    }

    #[test]
    fn test_raw_angle_bracket_in_attribute_cuts_value() {
        let groups = parse(r#"<A HREF="https://x.io/?a>b">X</A>"#);

        let url = &groups[0].tabs[0].url;
        assert_ne!(url, "https://x.io/?a>b");
        assert!(url.ends_with("x.io/?a"));
    }
}
