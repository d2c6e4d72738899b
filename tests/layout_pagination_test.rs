mod common;

use common::{FixedMetrics, RecordingSink, SinkCall};
use handscript::engine::layout::{
    CancelCheck, CancelToken, Cancelled, LayoutError, LayoutState, PageLayoutEngine, Progress,
};
use handscript::engine::params::{LayoutOptions, Parameters};
use handscript::engine::perturb::PerturbationModel;
use std::collections::BTreeMap;

const PAGE: (u32, u32) = (1000, 2000);

fn page_params() -> Parameters {
    Parameters {
        font_size: 50.0,
        ..Parameters::default()
    }
    .without_jitter()
}

/// 1語で1行を占める 40 文字の単語を `n` 個並べた段落
fn one_word_per_line(n: usize) -> String {
    vec!["x".repeat(40); n].join(" ")
}

fn run(
    params: &Parameters,
    options: LayoutOptions,
    text: &str,
    seed: u64,
    sink: &mut RecordingSink,
    cancel: &CancelToken,
) -> Result<handscript::engine::layout::LayoutSummary, LayoutError> {
    let metrics = FixedMetrics(10.0);
    let perturb = PerturbationModel::seeded(params, Some(seed));
    let mut engine = PageLayoutEngine::new(params, options, PAGE, &metrics, perturb);
    engine.run(text, sink, cancel, &mut |_: Progress| {})
}

#[test]
fn fifty_lines_fill_four_pages() {
    let params = page_params();
    let mut sink = RecordingSink::default();
    let summary = run(
        &params,
        LayoutOptions::default(),
        &one_word_per_line(50),
        1,
        &mut sink,
        &CancelToken::new(),
    )
    .expect("layout");

    assert_eq!(summary.pages, 4);
    assert_eq!(summary.lines, 50);

    let mut lines_per_page: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for g in &sink.glyphs {
        let lines = lines_per_page.entry(g.page).or_default();
        if lines.last() != Some(&g.line) {
            lines.push(g.line);
        }
    }
    let counts: Vec<usize> = lines_per_page.values().map(Vec::len).collect();
    assert_eq!(counts, vec![13, 13, 13, 11]);
}

#[test]
fn pages_are_contiguous_and_ordered() {
    let params = page_params();
    let mut sink = RecordingSink::default();
    run(
        &params,
        LayoutOptions::default(),
        &one_word_per_line(30),
        1,
        &mut sink,
        &CancelToken::new(),
    )
    .expect("layout");

    assert_eq!(
        sink.calls,
        vec![
            SinkCall::Begin(1),
            SinkCall::Finish(1),
            SinkCall::Begin(2),
            SinkCall::Finish(2),
            SinkCall::Begin(3),
            SinkCall::Finish(3),
        ]
    );
    let pages: Vec<usize> = sink.glyphs.iter().map(|g| g.page).collect();
    assert!(pages.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn every_character_is_placed_once_in_order() {
    let params = page_params();
    let text = "The quick  brown fox\n\njumps over\tthe lazy dog\r\nand keeps running";
    let mut sink = RecordingSink::default();
    run(&params, LayoutOptions::default(), text, 3, &mut sink, &CancelToken::new()).expect("layout");

    let expected: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let placed: String = sink.text().chars().filter(|c| *c != ' ').collect();
    assert_eq!(placed, expected);
}

#[test]
fn glyph_positions_follow_the_cursor() {
    let params = page_params();
    let mut sink = RecordingSink::default();
    run(&params, LayoutOptions::default(), "ab\ncd", 1, &mut sink, &CancelToken::new()).expect("layout");

    let origins: Vec<(f32, f32)> = sink.glyphs.iter().map(|g| (g.origin.x, g.origin.y)).collect();
    // 送り = 10 + 5、段落間 = 143 + 143 * 1.5
    assert_eq!(
        origins,
        vec![(180.0, 140.0), (195.0, 140.0), (180.0, 497.5), (195.0, 497.5)]
    );
    assert!(sink.glyphs.iter().all(|g| g.rotation == 0.0));
}

#[test]
fn first_line_of_a_new_page_starts_at_the_top_margin() {
    let params = page_params();
    let mut sink = RecordingSink::default();
    run(
        &params,
        LayoutOptions::default(),
        &one_word_per_line(14),
        1,
        &mut sink,
        &CancelToken::new(),
    )
    .expect("layout");

    let first_on_two = sink.glyphs.iter().find(|g| g.page == 2).expect("page 2");
    assert_eq!(first_on_two.origin.y, 140.0);
    assert_eq!(first_on_two.line, 13);
}

#[test]
fn zero_sigma_layout_ignores_the_seed() {
    let params = page_params();
    let text = one_word_per_line(20);

    let mut a = RecordingSink::default();
    let mut b = RecordingSink::default();
    run(&params, LayoutOptions::default(), &text, 1, &mut a, &CancelToken::new()).expect("layout");
    run(&params, LayoutOptions::default(), &text, 99, &mut b, &CancelToken::new()).expect("layout");

    assert_eq!(a.glyphs, b.glyphs);
}

#[test]
fn same_seed_reproduces_jittered_layout() {
    let params = Parameters {
        font_size: 50.0,
        line_spacing_sigma: 4.0,
        ..Parameters::default()
    };
    let text = one_word_per_line(20);

    let mut a = RecordingSink::default();
    let mut b = RecordingSink::default();
    run(&params, LayoutOptions::default(), &text, 42, &mut a, &CancelToken::new()).expect("layout");
    run(&params, LayoutOptions::default(), &text, 42, &mut b, &CancelToken::new()).expect("layout");

    assert_eq!(a.glyphs, b.glyphs);
    assert!(a.glyphs.iter().any(|g| g.rotation != 0.0));
}

#[test]
fn cancel_before_the_first_paragraph_writes_nothing() {
    let params = page_params();
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut sink = RecordingSink::default();
    let result = run(&params, LayoutOptions::default(), &one_word_per_line(5), 1, &mut sink, &cancel);

    assert_eq!(result, Err(LayoutError::Cancelled(Cancelled)));
    assert!(sink.finished_pages().is_empty());
    assert!(sink.glyphs.is_empty());
}

#[test]
fn paragraph_policy_finishes_the_started_paragraph() {
    let params = page_params();
    let cancel = CancelToken::new();
    let mut sink = RecordingSink {
        cancel_after: Some((1, cancel.clone())),
        ..RecordingSink::default()
    };
    let text = format!("{}\ntail", one_word_per_line(20));

    let result = run(&params, LayoutOptions::default(), &text, 1, &mut sink, &cancel);

    assert_eq!(result, Err(LayoutError::Cancelled(Cancelled)));
    assert_eq!(sink.glyphs.len(), 20 * 40);
    assert!(!sink.text().contains("tail"));
}

#[test]
fn line_policy_stops_between_lines() {
    let params = page_params();
    let cancel = CancelToken::new();
    let mut sink = RecordingSink {
        cancel_after: Some((1, cancel.clone())),
        ..RecordingSink::default()
    };
    let options = LayoutOptions {
        cancel_check: CancelCheck::Line,
        ..LayoutOptions::default()
    };

    let result = run(&params, options, &one_word_per_line(20), 1, &mut sink, &cancel);

    assert_eq!(result, Err(LayoutError::Cancelled(Cancelled)));
    assert_eq!(sink.glyphs.len(), 40);
}

#[test]
fn progress_is_reported_per_paragraph() {
    let params = page_params();
    let metrics = FixedMetrics(10.0);
    let perturb = PerturbationModel::seeded(&params, Some(1));
    let mut engine = PageLayoutEngine::new(&params, LayoutOptions::default(), PAGE, &metrics, perturb);

    let mut seen = Vec::new();
    let mut sink = RecordingSink::default();
    engine
        .run("a\nb\nc\nd", &mut sink, &CancelToken::new(), &mut |p: Progress| seen.push(p))
        .expect("layout");

    let percents: Vec<u8> = seen.iter().map(|p| p.percent).collect();
    assert_eq!(percents, vec![20, 37, 55, 72, 90]);
    assert_eq!(seen[0].message, "converting");
    assert_eq!(seen[1].message, "processing page 1");
    assert_eq!(engine.state(), LayoutState::Done);
}
