//! Reference resolution over a whole document

use crate::backends::{Environment, SecretStore};
use crate::document::{Node, Scalar};
use crate::error::SecretError;
use crate::reference::Reference;

/// Markers that identify a PEM-armored secret value
const PEM_MARKERS: [&str; 2] = ["PRIVATE KEY", "CERTIFICATE"];

/// A secret lookup that failed and was replaced by its source text
#[derive(Debug)]
pub struct LookupFailure {
    /// The leaf text as it appeared in the document
    pub reference: String,
    pub store_path: String,
    pub field: String,
    pub error: SecretError,
}

/// Output of a resolution run
#[derive(Debug)]
pub struct Resolution {
    /// The rebuilt document, always complete
    pub document: Node,

    /// Secret lookups that failed, in traversal order
    pub failures: Vec<LookupFailure>,
}

impl Resolution {
    /// True when every secret lookup succeeded or was simply absent
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Replaces secret and environment references in a document
#[derive(Debug)]
pub struct Resolver<'a, S: ?Sized, E: ?Sized> {
    store: &'a S,
    env: &'a E,
}

impl<'a, S, E> Resolver<'a, S, E>
where
    S: SecretStore + ?Sized,
    E: Environment + ?Sized,
{
    /// Create a resolver over the given lookup capabilities
    pub fn new(store: &'a S, env: &'a E) -> Self {
        Self { store, env }
    }

    /// Resolve every string leaf of `document`
    pub fn resolve(&self, document: &Node) -> Resolution {
        let mut failures = Vec::new();
        let document = self.resolve_node(document, &mut failures);
        Resolution { document, failures }
    }

    /// Resolve a single string leaf
    pub fn resolve_str(&self, raw: &str) -> (Scalar, Option<LookupFailure>) {
        let reference = Reference::classify(raw);
        tracing::trace!(kind = reference.kind_name(), "Resolving leaf");

        match reference {
            Reference::Secret { store_path, field } => {
                match self.store.fetch(&store_path, &field) {
                    Ok(Some(value)) => (Scalar::String(post_process(value)), None),
                    Ok(None) => {
                        tracing::debug!(
                            store_path = %store_path,
                            field = %field,
                            "Field absent from secret, keeping original text"
                        );
                        (Scalar::String(raw.to_string()), None)
                    }
                    Err(error) => {
                        tracing::warn!(
                            store_path = %store_path,
                            field = %field,
                            "Failed to fetch secret '{}/{}': {}",
                            store_path,
                            field,
                            error
                        );
                        let failure = LookupFailure {
                            reference: raw.to_string(),
                            store_path,
                            field,
                            error,
                        };
                        (Scalar::String(raw.to_string()), Some(failure))
                    }
                }
            }

            Reference::Env { var_name } => {
                let value = self.env.var(&var_name).unwrap_or_else(|| {
                    tracing::debug!(var = %var_name, "Environment variable not set, keeping original text");
                    raw.to_string()
                });
                (coerce(value), None)
            }

            Reference::Literal(text) => (Scalar::String(text), None),
        }
    }

    fn resolve_node(&self, node: &Node, failures: &mut Vec<LookupFailure>) -> Node {
        match node {
            Node::Mapping(entries) => Node::Mapping(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), self.resolve_node(value, failures)))
                    .collect(),
            ),
            Node::Sequence(items) => Node::Sequence(
                items
                    .iter()
                    .map(|item| self.resolve_node(item, failures))
                    .collect(),
            ),
            Node::Scalar(Scalar::String(raw)) => {
                let (scalar, failure) = self.resolve_str(raw);
                failures.extend(failure);
                Node::Scalar(scalar)
            }
            Node::Scalar(other) => Node::Scalar(other.clone()),
        }
    }
}

/// Resolve `document` with the given secret store and environment
pub fn resolve<S, E>(document: &Node, store: &S, env: &E) -> Resolution
where
    S: SecretStore + ?Sized,
    E: Environment + ?Sized,
{
    Resolver::new(store, env).resolve(document)
}

fn post_process(secret: String) -> String {
    if is_pem(&secret) {
        encode_pem(&secret)
    } else {
        secret
    }
}

/// Check if a secret value looks like a PEM-armored key or certificate
pub fn is_pem(secret: &str) -> bool {
    PEM_MARKERS.iter().any(|marker| secret.contains(marker))
}

/// Flatten a PEM blob onto a single line with literal `\n` escapes
pub fn encode_pem(secret: &str) -> String {
    secret.replace("\r\n", "\n").trim().replace('\n', "\\n")
}

/// Convert an environment value to a bool or integer when it reads as one
pub fn coerce(value: String) -> Scalar {
    if value.eq_ignore_ascii_case("true") {
        return Scalar::Bool(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return Scalar::Bool(false);
    }

    let digits = value.strip_prefix('-').unwrap_or(&value);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(n) = value.parse::<i64>() {
            return Scalar::Int(n);
        }
    }

    Scalar::String(value)
}
