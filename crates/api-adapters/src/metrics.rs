//! Prometheus counters exposed on `/metrics`.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

use domains::{VoteChoice, VoteTarget};

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct VoteLabels {
    pub target: String,
    pub choice: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct LoginLabels {
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    posts: Counter,
    comments: Counter,
    votes: Family<VoteLabels, Counter>,
    logins: Family<LoginLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("doot");
        let posts = Counter::default();
        let comments = Counter::default();
        let votes = Family::<VoteLabels, Counter>::default();
        let logins = Family::<LoginLabels, Counter>::default();

        registry.register("posts_created", "Posts created", posts.clone());
        registry.register("comments_created", "Comments created", comments.clone());
        registry.register("votes", "Votes applied, by target and choice", votes.clone());
        registry.register("logins", "Login attempts, by outcome", logins.clone());

        Self {
            registry,
            posts,
            comments,
            votes,
            logins,
        }
    }

    pub fn post_created(&self) {
        self.posts.inc();
    }

    pub fn comment_created(&self) {
        self.comments.inc();
    }

    pub fn vote(&self, target: VoteTarget, choice: VoteChoice) {
        self.votes
            .get_or_create(&VoteLabels {
                target: target.as_str().to_string(),
                choice: choice.as_str().to_string(),
            })
            .inc();
    }

    pub fn login(&self, success: bool) {
        let outcome = if success { "success" } else { "failure" };
        self.logins
            .get_or_create(&LoginLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn encode(&self) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        encode(&mut out, &self.registry)?;
        Ok(out)
    }
}
