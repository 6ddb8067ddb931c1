use regex::Regex;
use tracing::trace;
use weft_http::protocol::Params;

use crate::router::RouteError;

/// A path variable is a `/:name` segment of a template.
const VARIABLE: &str = r"/:([a-zA-Z0-9_\-]+)";
/// What a path variable matches: a non-empty segment.
const SEGMENT: &str = r"/([a-zA-Z0-9_\-]+)";
/// An optional trailing slash, an optional `?k=v&k=v` query and an optional fragment.
const SUFFIX: &str = r"/?(\?[^=&#]+=[^&#]*(?:&[^=&#]+=[^&#]*)*)?(?:#.*)?$";
const QUERY_PAIR: &str = r"[?&]([^=&#]+)=([^&#]*)";

/// Matches request targets against a path template such as
/// `/users/:user_id/articles/:article_id`.
///
/// A match binds every `:name` segment and every query parameter into the
/// request [`Params`]. A query parameter replaces a path variable of the
/// same name.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    template: String,
    pattern: Regex,
    query_pair: Regex,
    variables: Vec<String>,
}

impl RouteMatcher {
    pub fn new(template: impl Into<String>) -> Result<Self, RouteError> {
        let template = template.into();
        let compile = |pattern: &str| Regex::new(pattern).map_err(|source| RouteError::Compile { template: template.clone(), source });

        let variable = compile(VARIABLE)?;
        let body = template.strip_suffix('/').unwrap_or(&template);

        let mut pattern = String::from("^");
        let mut variables = Vec::new();
        let mut last = 0;
        for captures in variable.captures_iter(body) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            pattern.push_str(&regex::escape(&body[last..whole.start()]));
            pattern.push_str(SEGMENT);
            variables.push(name.as_str().to_owned());
            last = whole.end();
        }
        pattern.push_str(&regex::escape(&body[last..]));
        pattern.push_str(SUFFIX);

        trace!(template = %template, pattern = %pattern, "compile route template");
        Ok(Self { pattern: compile(&pattern)?, query_pair: compile(QUERY_PAIR)?, variables, template })
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The path variable names, in template order.
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Matches `target` and, on success only, writes path variables then
    /// query parameters into `params`.
    pub fn matches(&self, target: &str, params: &mut Params) -> bool {
        let Some(captures) = self.pattern.captures(target) else {
            return false;
        };

        for (name, value) in self.variables.iter().zip(captures.iter().skip(1)) {
            if let Some(value) = value {
                params.insert(name.clone(), value.as_str().to_owned());
            }
        }

        if let Some(query) = captures.get(self.variables.len() + 1) {
            for pair in self.query_pair.captures_iter(query.as_str()) {
                params.insert(pair[1].to_owned(), pair[2].to_owned());
            }
        }
        true
    }
}
