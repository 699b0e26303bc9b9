// tests/pipeline_e2e.rs
//
// One full curation pass with every collaborator faked in-process:
// source loading, failure isolation per branch, verification, ranking.

mod common;

use std::sync::Arc;

use anyhow::anyhow;
use serde_json::json;

use common::{strings, verifier, FakeChannel, FakePages, FakeStars, FixedLoader, KeywordClassifier};
use content_curator::config::SlackConfig;
use content_curator::curate::{CurationPipeline, CurationRequest};
use content_curator::sources::SlackLoader;
use content_curator::CurateError;

fn pages() -> Arc<FakePages> {
    Arc::new(FakePages::with(&[
        ("https://github.com/acme/small", "small langgraph repo"),
        ("https://github.com/acme/big", "big LangGraph platform"),
        ("https://github.com/acme/other", "rust game engine"),
        ("https://blog.example/agents", "building agents with LangGraph"),
        ("https://blog.example/food", "pasta recipes"),
        ("https://news.example/supplied", "LangGraph release notes"),
        ("https://slack.example/shared", "langgraph in production"),
    ]))
}

fn stars() -> Arc<FakeStars> {
    Arc::new(FakeStars::with(&[("acme/small", 15), ("acme/big", 900)]))
}

#[tokio::test]
async fn full_run_verifies_ranks_and_merges_every_source() {
    let llm = Arc::new(KeywordClassifier::new("langgraph"));
    let github = Arc::new(FixedLoader::ok(
        "github",
        &[
            "https://github.com/acme/small",
            "https://github.com/acme/other",
            "https://github.com/acme/big",
        ],
    ));
    let web = Arc::new(FixedLoader::ok(
        "latent_space",
        &["https://blog.example/agents", "https://blog.example/food"],
    ));

    let pipeline = CurationPipeline::new(github, verifier(pages(), llm.clone()), stars())
        .with_web_loader(web);

    let req: CurationRequest = serde_json::from_value(json!({
        "links": ["https://news.example/supplied", "https://blog.example/agents"],
        "redditPosts": [
            { "post": { "id": "1", "title": "low", "score": 3 } },
            { "post": { "id": "2", "title": "high", "score": 40 } }
        ]
    }))
    .unwrap();

    let out = pipeline.run(req).await.unwrap();

    let repos: Vec<_> = out
        .github_trending_data
        .as_ref()
        .unwrap()
        .iter()
        .map(|r| (r.repo_url.as_str(), r.stargazers_count))
        .collect();
    assert_eq!(
        repos,
        vec![
            ("https://github.com/acme/big", 900),
            ("https://github.com/acme/small", 15)
        ]
    );

    let general = out.general_contents.as_ref().unwrap();
    let links: Vec<_> = general.iter().map(|g| g.relevant_links.clone()).collect();
    assert_eq!(
        links,
        vec![
            strings(&["https://blog.example/agents"]),
            strings(&["https://news.example/supplied"]),
        ]
    );
    assert_eq!(general[0].page_content, "building agents with LangGraph");

    let titles: Vec<_> = out
        .reddit_posts
        .as_ref()
        .unwrap()
        .iter()
        .map(|p| p.post.title.as_str())
        .collect();
    assert_eq!(titles, vec!["high", "low"]);
    assert!(out.tweets_grouped_by_content.is_none());

    // 3 repos + 3 distinct general links.
    assert_eq!(llm.calls(), 6);
}

#[tokio::test]
async fn failing_source_branch_contributes_nothing() {
    let llm = Arc::new(KeywordClassifier::new("langgraph"));
    let github = Arc::new(FixedLoader::failing("github", anyhow!("search API down")));
    let web = Arc::new(FixedLoader::ok("latent_space", &["https://blog.example/agents"]));

    let pipeline =
        CurationPipeline::new(github, verifier(pages(), llm), stars()).with_web_loader(web);
    let out = pipeline.run(CurationRequest::default()).await.unwrap();

    assert_eq!(out.github_trending_data, Some(Vec::new()));
    assert_eq!(out.general_contents.as_ref().map(Vec::len), Some(1));
}

#[tokio::test]
async fn fatal_source_error_terminates_the_run() {
    let llm = Arc::new(KeywordClassifier::new("langgraph"));
    let github = Arc::new(FixedLoader::failing(
        "github",
        CurateError::MissingCredential("GITHUB_TOKEN").into(),
    ));
    let pipeline = CurationPipeline::new(github, verifier(pages(), llm.clone()), stars());

    let err = pipeline.run(CurationRequest::default()).await.unwrap_err();
    assert!(CurateError::is_fatal(&err));
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn slack_links_join_the_general_candidates() {
    let llm = Arc::new(KeywordClassifier::new("langgraph"));
    let channel = Arc::new(FakeChannel::with_texts(&[
        "worth a look <https://slack.example/shared|shared>",
        "also <https://blog.example/food>",
    ]));
    let slack = SlackLoader::new(
        channel.clone(),
        SlackConfig {
            channel_id: Some("C1".into()),
            ..Default::default()
        },
    );
    let pipeline = CurationPipeline::new(
        Arc::new(FixedLoader::ok("github", &[])),
        verifier(pages(), llm),
        stars(),
    )
    .with_slack(slack);

    let out = pipeline.run(CurationRequest::default()).await.unwrap();
    let links: Vec<_> = out
        .general_contents
        .unwrap()
        .into_iter()
        .flat_map(|g| g.relevant_links)
        .collect();
    assert_eq!(links, strings(&["https://slack.example/shared"]));
    assert_eq!(channel.call_count(), 1);
}

#[tokio::test]
async fn skip_ingest_with_no_links_terminates_the_run() {
    let llm = Arc::new(KeywordClassifier::new("langgraph"));
    let channel = Arc::new(FakeChannel::default());
    let slack = SlackLoader::new(
        channel.clone(),
        SlackConfig {
            skip_ingest: true,
            ..Default::default()
        },
    );
    let pipeline = CurationPipeline::new(
        Arc::new(FixedLoader::ok("github", &[])),
        verifier(pages(), llm),
        stars(),
    )
    .with_slack(slack);

    let err = pipeline.run(CurationRequest::default()).await.unwrap_err();
    assert!(matches!(
        CurateError::find(&err),
        Some(CurateError::MissingState(_))
    ));
    assert_eq!(channel.call_count(), 0);
}
