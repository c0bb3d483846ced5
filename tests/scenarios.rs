use posting_dedup::{
    similarity, DuplicateDetector, JsonFileStore, MatchReason, Posting, PostingStore,
};

fn posting(id: &str, source: &str, title: &str, url: &str) -> Posting {
    Posting::new(source).with_id(id).with_title(title).with_url(url)
}

#[test]
fn shared_url_collapses_to_first_posting() {
    let batch = vec![
        posting("1", "s", "Need Facebook Ads Help", "http://e.com/1"),
        posting("2", "s", "Need Facebook Ads Help", "http://e.com/1"),
        posting("3", "s", "Google Ads Specialist Needed", "http://e.com/2"),
    ];

    let result = DuplicateDetector::default().dedupe(batch);

    assert_eq!(result.unique.len(), 2);
    assert_eq!(result.duplicates.len(), 1);
    assert_eq!(result.duplicates[0].duplicate_of, "1");
    assert_eq!(result.duplicates[0].posting.id.as_deref(), Some("2"));
}

#[test]
fn same_source_near_identical_titles_are_duplicates() {
    let detector = DuplicateDetector::default();
    let a = Posting::new("reddit_forhire")
        .with_title("Need Google Ads Help ASAP for Ecommerce Store Launch")
        .with_url("https://reddit.com/r/forhire/a")
        .with_text("Budget around five hundred dollars.");
    let b = Posting::new("reddit_forhire")
        .with_title("Need Google Ads Help ASAP for Ecommerce Store Launch Now")
        .with_url("https://reddit.com/r/forhire/b")
        .with_text("Reposting because nobody answered yesterday, please DM me.");

    // 9 of 10 title words shared
    let found = detector.classify(&a, &b).expect("duplicate");
    assert_eq!(found.reason, MatchReason::SourceTitle);
    assert!(found.score >= 0.9);
}

#[test]
fn one_extra_word_in_a_short_title_is_below_the_title_threshold() {
    let a = "Need Google Ads Help ASAP";
    let b = "Need Google Ads Help ASAP Now";
    assert!((similarity(a, b) - 5.0 / 6.0).abs() < 1e-12);

    let detector = DuplicateDetector::default();
    let first = Posting::new("s").with_title(a).with_text("Looking for a freelancer");
    let second = Posting::new("s").with_title(b).with_text("Small agency needs a contractor");
    assert!(!detector.is_duplicate(&first, &second));
}

#[test]
fn cross_source_bodies_match_on_content() {
    let body = "We are a small dental clinic looking for someone to run our local \
                search marketing campaigns, manage the weekly budget, write ad copy, \
                report monthly results and improve conversion tracking on the website";
    let a = Posting::new("hackernews")
        .with_title("Marketing contractor")
        .with_text(body);
    let b = Posting::new("reddit_forhire")
        .with_title("Hiring")
        .with_text(format!("{body} quickly"));

    let detector = DuplicateDetector::default();
    let found = detector.classify(&a, &b).expect("duplicate");
    assert_eq!(found.reason, MatchReason::Content);
    assert!(found.score >= 0.85);
}

#[test]
fn assigned_ids_are_stable_across_runs() {
    let detector = DuplicateDetector::default();
    let anonymous = Posting::new("upwork")
        .with_url("https://upwork.com/jobs/123")
        .with_title("WordPress plugin fix");

    let first = detector.dedupe(vec![anonymous.clone()]);
    let second = detector.dedupe(vec![anonymous]);

    let id = first.unique[0].id.clone().expect("assigned id");
    assert_eq!(second.unique[0].id.as_deref(), Some(id.as_str()));
}

#[test]
fn existing_check_finds_content_match_in_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("postings.json"));
    store
        .append(&[
            Posting::new("hackernews")
                .with_id("hn-1")
                .with_title("Seeking bookkeeping help for our startup")
                .with_text("Monthly reconciliation and payroll for ten employees"),
            Posting::new("reddit_forhire")
                .with_id("rd-1")
                .with_title("Need React developer")
                .with_text("Landing page rebuild"),
        ])
        .unwrap();

    let incoming = Posting::new("upwork")
        .with_id("up-7")
        .with_title("Seeking bookkeeping help for our startup")
        .with_text("Monthly reconciliation and payroll for ten employees");
    assert_eq!(store.get_by_id("up-7").unwrap(), None);

    let check = DuplicateDetector::default()
        .check_existing(&incoming, &store)
        .unwrap();
    assert!(check.exists);
    assert!(check.via_similarity());
    assert_eq!(
        check.matched_posting.and_then(|p| p.id).as_deref(),
        Some("hn-1")
    );
}

#[test]
fn ingest_plan_only_persists_new_postings() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("postings.json"));
    let detector = DuplicateDetector::default();

    let batch = vec![
        posting("1", "s", "Need Facebook Ads Help", "http://e.com/1"),
        posting("2", "s", "Need Facebook Ads Help", "http://e.com/1"),
        posting("3", "s", "Google Ads Specialist Needed", "http://e.com/2"),
    ];

    let plan = detector.plan_ingest(batch.clone(), &store).unwrap();
    assert_eq!(plan.fresh.len(), 2);
    store.append(&plan.fresh).unwrap();

    let rerun = detector.plan_ingest(batch, &store).unwrap();
    assert!(rerun.fresh.is_empty());
    assert_eq!(rerun.already_stored.len(), 2);
    assert_eq!(rerun.batch_duplicates.len(), 1);
}
