// src/verify.rs
//! Relevance verification of a single link.

use anyhow::{Context, Result};
use metrics::counter;
use std::sync::Arc;
use tracing::debug;

use crate::config::ProductConfig;
use crate::content::PageLoader;
use crate::llm::{invoke_structured, DynLlm, ModelRole, Relevancy};
use crate::prompts::verify_relevance_prompt;

/// Outcome of verifying one link: either both the link and its content, or
/// nothing. The two lists always have the same length (0 or 1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verification {
    relevant_links: Vec<String>,
    page_contents: Vec<String>,
}

impl Verification {
    pub fn relevant(link: String, page_content: String) -> Self {
        Self {
            relevant_links: vec![link],
            page_contents: vec![page_content],
        }
    }

    pub fn irrelevant() -> Self {
        Self::default()
    }

    pub fn is_relevant(&self) -> bool {
        !self.relevant_links.is_empty()
    }

    pub fn relevant_links(&self) -> &[String] {
        &self.relevant_links
    }

    pub fn page_contents(&self) -> &[String] {
        &self.page_contents
    }

    /// `(link, content)` when relevant.
    pub fn into_pair(self) -> Option<(String, String)> {
        let link = self.relevant_links.into_iter().next()?;
        let content = self.page_contents.into_iter().next()?;
        Some((link, content))
    }
}

pub struct RelevanceVerifier {
    loader: Arc<dyn PageLoader>,
    llm: DynLlm,
    role: ModelRole,
    product_name: String,
    instruction: String,
}

impl RelevanceVerifier {
    pub fn new(
        loader: Arc<dyn PageLoader>,
        llm: DynLlm,
        role: ModelRole,
        product: &ProductConfig,
    ) -> Self {
        Self {
            loader,
            llm,
            role,
            product_name: product.name.clone(),
            instruction: verify_relevance_prompt(product),
        }
    }

    /// Crawls `link` and asks the classifier whether the content is relevant.
    /// An irrelevant verdict is an empty [`Verification`], not an error.
    pub async fn verify(&self, link: &str) -> Result<Verification> {
        let page_content = self
            .loader
            .load(link)
            .await
            .with_context(|| format!("loading page content for {link}"))?;

        let verdict: Relevancy = invoke_structured(
            self.llm.as_ref(),
            &self.role,
            &self.instruction,
            &page_content,
            Relevancy::schema(&self.product_name),
        )
        .await
        .with_context(|| format!("classifying relevancy of {link}"))?;

        crate::metrics::ensure_metrics_described();
        let label = if verdict.relevant { "relevant" } else { "irrelevant" };
        counter!("curate_verified_total", "verdict" => label).increment(1);
        debug!(
            target: "verify",
            link,
            relevant = verdict.relevant,
            content_len = page_content.len(),
            "relevancy verdict"
        );

        Ok(if verdict.relevant {
            Verification::relevant(link.to_string(), page_content)
        } else {
            Verification::irrelevant()
        })
    }
}
