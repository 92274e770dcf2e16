use crate::error::RouteError;
use crate::gateway::registry::BackendRegistry;

/// Fully composed backend target for one inbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDescriptor {
    pub url: String,
}

/// Resolve an inbound path against the registry and compose the target URL.
///
/// The query string is stripped before prefix matching and reattached
/// verbatim afterwards; it is never parsed or re-encoded. The matched
/// prefix is replaced by the route's rewrite value as a literal substring,
/// first occurrence only — if the prefix text reappears later in the path
/// it is left untouched. That is a documented compatibility constraint,
/// not an anchored-prefix rewrite.
pub fn route(
    registry: &BackendRegistry,
    raw_path: &str,
    query: Option<&str>,
) -> Result<TargetDescriptor, RouteError> {
    let path = match raw_path.find('?') {
        Some(pos) => &raw_path[..pos],
        None => raw_path,
    };

    let matched = registry.resolve(path).ok_or(RouteError::NotFound)?;

    let rewritten = path.replacen(&matched.path_prefix, &matched.rewrite_to, 1);

    let url = match query {
        Some(q) if !q.is_empty() => {
            format!("{}{}?{}", matched.target_base_url, rewritten, q)
        }
        _ => format!("{}{}", matched.target_base_url, rewritten),
    };

    Ok(TargetDescriptor { url })
}
