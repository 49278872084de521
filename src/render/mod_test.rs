use super::*;

// =============================================================================
// escape_html / fill
// =============================================================================

#[test]
fn escape_html_covers_markup_characters() {
    assert_eq!(escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;");
    assert_eq!(escape_html("plain"), "plain");
}

#[test]
fn fill_replaces_known_tokens() {
    let out = fill("<h1>{{TITLE}}</h1><p>{{BODY}}</p>", &[("TITLE", "Hi"), ("BODY", "there")]);
    assert_eq!(out, "<h1>Hi</h1><p>there</p>");
}

#[test]
fn fill_leaves_unknown_tokens_and_unclosed_braces() {
    assert_eq!(fill("{{MISSING}} ok", &[]), "{{MISSING}} ok");
    assert_eq!(fill("a {{OPEN", &[("OPEN", "x")]), "a {{OPEN");
}

#[test]
fn fill_does_not_rescan_substituted_values() {
    let out = fill("{{A}}|{{B}}", &[("A", "{{B}}"), ("B", "secret")]);
    assert_eq!(out, "{{B}}|secret");
}

// =============================================================================
// Formatting
// =============================================================================

#[test]
fn format_price_groups_thousands() {
    assert_eq!(format_price(0), "$0");
    assert_eq!(format_price(899), "$899");
    assert_eq!(format_price(2499), "$2,499");
    assert_eq!(format_price(1_250_000), "$1,250,000");
}

#[test]
fn format_rating_one_decimal() {
    assert_eq!(format_rating(4.0), "4.0");
    assert_eq!(format_rating(4.86), "4.9");
}

// =============================================================================
// URLs and preload hints
// =============================================================================

#[test]
fn safe_urls() {
    assert!(is_safe_url("/static/img/a.jpg"));
    assert!(is_safe_url("https://res.cloudinary.com/x/image/upload/a.jpg"));
    assert!(!is_safe_url("//evil.example/a.jpg"));
    assert!(!is_safe_url("javascript:alert(1)"));
    assert!(!is_safe_url("/a.jpg\" onerror=\"x"));
    assert!(!is_safe_url("/a b.jpg"));
}

#[test]
fn preload_link_header_lists_images() {
    let urls = vec!["/static/a.jpg".to_owned(), "https://cdn.example/b.jpg".to_owned()];
    assert_eq!(
        preload_link_header(&urls).as_deref(),
        Some("</static/a.jpg>; rel=preload; as=image, <https://cdn.example/b.jpg>; rel=preload; as=image")
    );
}

#[test]
fn preload_link_header_skips_unsafe_and_empty() {
    assert!(preload_link_header(&[]).is_none());
    assert!(preload_link_header(&["javascript:x".to_owned(), "/a,b.jpg".to_owned()]).is_none());
}

// =============================================================================
// Layout
// =============================================================================

#[test]
fn layout_escapes_title_and_marks_active_nav() {
    let site = SiteConfig::default();
    let html = layout(&site, "<Tours>", "desc", Nav::Tours, &[], "<p>body</p>");
    assert!(html.contains("<title>&lt;Tours&gt; | Wayfarer Travel</title>"));
    assert!(html.contains("<a href=\"/tours\" class=\"active\">Tours</a>"));
    assert!(html.contains("<p>body</p>"));
    assert!(!html.contains("{{"));
}

#[test]
fn layout_emits_preload_tags() {
    let site = SiteConfig::default();
    let html = layout(&site, "T", "d", Nav::None, &["/static/img/x.jpg".to_owned()], "");
    assert!(html.contains("<link rel=\"preload\" as=\"image\" href=\"/static/img/x.jpg\">"));
}

#[test]
fn layout_shows_whatsapp_only_when_configured() {
    let mut site = SiteConfig::default();
    assert!(!layout(&site, "", "", Nav::Home, &[], "").contains("wa.me"));
    site.whatsapp_number = Some("15550102030".into());
    assert!(layout(&site, "", "", Nav::Home, &[], "").contains("https://wa.me/15550102030"));
}

#[test]
fn notice_html_variants() {
    assert_eq!(notice_html(None), "");
    let ok = notice_html(Some(&Notice::Success {
        message: "Sent <ok>".into(),
        whatsapp_url: Some("https://wa.me/1?text=hi".into()),
    }));
    assert!(ok.contains("notice-success"));
    assert!(ok.contains("Sent &lt;ok&gt;"));
    assert!(ok.contains("https://wa.me/1?text=hi"));

    let err = notice_html(Some(&Notice::Error { message: "Nope".into(), whatsapp_url: None }));
    assert!(err.contains("notice-error"));
    assert!(!err.contains("wa.me"));
}

#[test]
fn not_found_page_escapes_message() {
    let html = not_found(&SiteConfig::default(), "No tour called <b>x</b>");
    assert!(html.contains("No tour called &lt;b&gt;x&lt;/b&gt;"));
}
