use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// An identifier indicating the destination of a navigation.
///
/// Feature modules define their own destination types, usually an enum with
/// one case per screen reachable from that module, nested next to the screen
/// that originates the navigation, and implement this trait to make them
/// storable in a [`NavigationPath`](crate::path::NavigationPath):
///
/// ```
/// use navstack::Destination;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// enum SearchDestination {
///     Results { query: String },
///     Filters,
/// }
/// impl Destination for SearchDestination {}
/// ```
///
/// The bounds are what the path needs from an entry it cannot inspect:
/// structural equality and hashing so the rendering container can use
/// entries as identity keys when diffing the stack, and serde support so a
/// path can be encoded and later decoded through a
/// [`Resolver`](crate::resolver::Resolver) with the same types registered.
pub trait Destination:
    Any + fmt::Debug + Clone + Eq + Hash + Serialize + DeserializeOwned
{
    /// The tag identifying this destination type inside encoded paths.
    ///
    /// Defaults to the Rust type name, which is unique within one binary but
    /// not guaranteed stable across compiler versions; override it when
    /// encoded paths outlive the binary that produced them.
    fn tag() -> &'static str
    where
        Self: Sized,
    {
        std::any::type_name::<Self>()
    }
}

/// Object-safe form of [`Destination`], so values of unrelated destination
/// types can share one stack. Everything a destination can do is forwarded
/// through here by downcasting back to the concrete type at the boundary.
trait ErasedDestination {
    fn as_any(&self) -> &dyn Any;
    fn type_tag(&self) -> &'static str;
    fn dyn_eq(&self, other: &dyn ErasedDestination) -> bool;
    fn dyn_hash(&self, state: &mut dyn Hasher);
    fn dyn_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
    fn encode_value(&self) -> Result<serde_json::Value, serde_json::Error>;
}

impl<D: Destination> ErasedDestination for D {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_tag(&self) -> &'static str {
        D::tag()
    }

    fn dyn_eq(&self, other: &dyn ErasedDestination) -> bool {
        other
            .as_any()
            .downcast_ref::<D>()
            .is_some_and(|other| self == other)
    }

    fn dyn_hash(&self, mut state: &mut dyn Hasher) {
        self.hash(&mut state);
    }

    fn dyn_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }

    fn encode_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// A type-erased destination value, as stored in the path.
///
/// Two `AnyDestination`s are equal when they hold the same concrete type and
/// the payloads compare equal; hashing covers the concrete type first and
/// the payload second, so values of different destination types never
/// collide structurally. Cloning is cheap; the erased value is shared.
#[derive(Clone)]
pub struct AnyDestination(Rc<dyn ErasedDestination>);

impl AnyDestination {
    /// Erase a destination value.
    pub fn new(destination: impl Destination) -> Self {
        Self(Rc::new(destination))
    }

    /// Returns a reference to the concrete destination, if it is a `D`.
    ///
    /// This is the dispatch primitive resolvers are built from.
    pub fn downcast_ref<D: Destination>(&self) -> Option<&D> {
        self.0.as_any().downcast_ref()
    }

    /// Whether the erased value is a `D`.
    pub fn is<D: Destination>(&self) -> bool {
        self.0.as_any().is::<D>()
    }

    /// The tag of the concrete destination type, see [`Destination::tag`].
    pub fn type_tag(&self) -> &'static str {
        self.0.type_tag()
    }

    pub(crate) fn type_id_of(&self) -> TypeId {
        self.0.as_any().type_id()
    }

    /// Encode the destination to its tagged, serialized form.
    pub fn encode(&self) -> Result<EncodedDestination, EncodeError> {
        Ok(EncodedDestination {
            tag: self.0.type_tag().to_string(),
            value: self.0.encode_value().map_err(EncodeError)?,
        })
    }
}

impl<D: Destination> From<D> for AnyDestination {
    fn from(destination: D) -> Self {
        Self::new(destination)
    }
}

impl PartialEq for AnyDestination {
    fn eq(&self, other: &Self) -> bool {
        self.0.dyn_eq(other.0.as_ref())
    }
}

impl Eq for AnyDestination {}

impl Hash for AnyDestination {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.as_any().type_id().hash(state);
        self.0.dyn_hash(state);
    }
}

impl fmt::Debug for AnyDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.dyn_debug(f)
    }
}

/// One path entry in encoded form: the destination's type tag plus its
/// serialized payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EncodedDestination {
    pub tag: String,
    pub value: serde_json::Value,
}

/// A destination's payload failed to serialize.
#[derive(Debug)]
pub struct EncodeError(serde_json::Error);

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to encode destination: {}", self.0)
    }
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::hash::{DefaultHasher, Hash, Hasher};

    use serde::{Deserialize, Serialize};

    use super::{AnyDestination, Destination};

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Step {
        Plain,
        Named(String),
    }
    impl Destination for Step {}

    #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Other {
        Plain,
    }
    impl Destination for Other {
        fn tag() -> &'static str {
            "other"
        }
    }

    fn hash_of(destination: &AnyDestination) -> u64 {
        let mut hasher = DefaultHasher::new();
        destination.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn equality_covers_type_and_payload() {
        let a = AnyDestination::new(Step::Named("x".to_string()));
        let b = AnyDestination::new(Step::Named("x".to_string()));
        let c = AnyDestination::new(Step::Named("y".to_string()));
        assert_eq!(a, b);
        assert_ne!(a, c, "same type, different payload");
        assert_ne!(
            AnyDestination::new(Step::Plain),
            AnyDestination::new(Other::Plain),
            "same shape, different type"
        );
    }

    #[test]
    fn hash_discriminates_by_type_first() {
        let step = AnyDestination::new(Step::Plain);
        let other = AnyDestination::new(Other::Plain);
        assert_eq!(hash_of(&step), hash_of(&step.clone()));
        assert_ne!(hash_of(&step), hash_of(&other));
    }

    #[test]
    fn downcast_reaches_the_concrete_value() {
        let destination = AnyDestination::new(Step::Named("x".to_string()));
        assert!(destination.is::<Step>());
        assert!(!destination.is::<Other>());
        assert_eq!(
            destination.downcast_ref::<Step>(),
            Some(&Step::Named("x".to_string()))
        );
        assert_eq!(destination.downcast_ref::<Other>(), None);
    }

    #[test]
    fn tag_defaults_to_type_name_and_can_be_overridden() {
        let step = AnyDestination::new(Step::Plain);
        assert!(step.type_tag().ends_with("Step"));
        assert_eq!(AnyDestination::new(Other::Plain).type_tag(), "other");
    }

    #[test]
    fn encode_carries_tag_and_payload() {
        let encoded = AnyDestination::new(Step::Named("x".to_string()))
            .encode()
            .unwrap();
        assert!(encoded.tag.ends_with("Step"));
        assert_eq!(encoded.value, serde_json::json!({ "Named": "x" }));
    }
}
