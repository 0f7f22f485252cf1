use notifycard_core::sanitize::sanitizer::{
    is_allowed_attr, is_allowed_tag, sanitize_html_with_report, ALLOWED_TAGS,
};
use notifycard_core::{normalize_newlines, sanitize_html, sanitize_notification, Node};

const HOSTILE_INPUTS: &[&str] = &[
    "<script>alert(1)</script>safe",
    "<img src=x onerror=alert(1)>",
    "<a href='https://example.com' onclick='steal()' target=_blank>go</a>",
    "<svg><g onload=bad()><circle/></g></svg>text",
    "<div><iframe src='//evil'></iframe><b>bold</b></div>",
    "<math><mi xlink:href=javascript:alert(1)>x</mi></math>",
    "<table><tr><td>cell</td></tr></table>",
    "<style>body{}</style><span style='color:red' data-x=1>s</span>",
    "<video controls preload=auto onplay=x()><source src=a.mp4 type=video/mp4></video>",
    "<ha-alert alert-type=info ONMOUSEOVER=x()>note</ha-alert>",
    "unclosed <b>bold <i>italic",
    "<!-- comment --><!DOCTYPE html>&amp;&lt;tag&gt;",
    "<a href=x><table><a href=y>z</a></table></a>",
    "<a href=x><div><a href=y>z</a></div></a>",
    "<table><b>x</b><tr><td>y</td></tr></table>",
    "<b><p>x</b>y</p>",
    "<a href=1>a<div>b</a>c</div>",
    "<i><b>x</i>y</b>",
];

#[test]
fn newline_becomes_line_break_end_to_end() {
    assert_eq!(normalize_newlines("hello\nworld"), "hello<br>world");
    let fragment = sanitize_notification("hello\nworld");
    assert_eq!(fragment.to_html(), "hello<br>world");
    assert_eq!(fragment.elements().len(), 1);
    assert_eq!(fragment.elements()[0].tag, "br");
}

#[test]
fn script_content_survives_only_as_text() {
    let fragment = sanitize_notification("<script>alert(1)</script>safe");
    assert_eq!(fragment.text_content(), "alert(1)safe");
    assert!(fragment.elements().is_empty());
}

#[test]
fn image_keeps_src_but_loses_handler() {
    let fragment = sanitize_notification("<img src='x.png' onerror='bad()'>");
    assert_eq!(fragment.to_html(), r#"<img src="x.png">"#);
}

#[test]
fn output_only_contains_allowed_tags_and_attributes() {
    for input in HOSTILE_INPUTS {
        let fragment = sanitize_html(input);
        for element in fragment.elements() {
            assert!(is_allowed_tag(&element.tag), "{input}: tag {}", element.tag);
            assert!(ALLOWED_TAGS.contains(&element.tag.as_str()));
            for name in element.attrs.keys() {
                assert!(is_allowed_attr(name), "{input}: attr {name}");
                assert!(!name.starts_with("on"), "{input}: attr {name}");
            }
        }
    }
}

#[test]
fn sanitizing_twice_changes_nothing() {
    for input in HOSTILE_INPUTS {
        let once = sanitize_html(input);
        let twice = sanitize_html(&once.to_html());
        assert_eq!(once, twice, "not idempotent for {input}");
        assert_eq!(once.to_html(), twice.to_html());
    }
}

#[test]
fn sanitizing_is_deterministic() {
    for input in HOSTILE_INPUTS {
        assert_eq!(sanitize_html(input), sanitize_html(input));
    }
}

#[test]
fn report_counts_removed_markup() {
    let (fragment, report) = sanitize_html_with_report(
        "<a href='/x' onclick='y()' rel=nofollow>a</a><iframe>b</iframe>",
    );
    assert_eq!(fragment.to_html(), r#"<a href="/x">a</a>b"#);
    assert_eq!(report.removed_attributes, 2);
    assert_eq!(report.flattened_elements, 1);
    assert!(!report.is_clean());

    let (_, report) = sanitize_html_with_report("<b>plain</b>");
    assert!(report.is_clean());
}

#[test]
fn entities_round_trip_as_text() {
    let fragment = sanitize_html("&lt;b&gt;not bold&lt;/b&gt; &amp; more");
    assert_eq!(fragment.nodes, vec![Node::text("<b>not bold</b> & more")]);
    assert_eq!(
        fragment.to_html(),
        "&lt;b&gt;not bold&lt;/b&gt; &amp; more"
    );
}

#[test]
fn empty_and_whitespace_inputs_are_total() {
    assert!(sanitize_notification("").is_empty());
    assert_eq!(sanitize_notification("  ").to_html(), "  ");
    assert_eq!(sanitize_notification("\n").to_html(), "<br>");
}
