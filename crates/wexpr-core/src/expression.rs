//! The Wexpr expression tree.
//!
//! An [`Expression`] is a tagged tree node owning its payload: a UTF-8 value,
//! a raw byte buffer, an ordered list of children, or an ordered list of
//! key/value pairs. Both codecs produce and consume this one type.
//!
//! Ownership follows the tree: inserting a child into an array or map moves
//! it into the container, `clone` is a deep copy, and dropping the root frees
//! the whole subtree.

/// Discriminant of an [`Expression`], for callers that switch on shape
/// without caring about the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionType {
    Invalid,
    Null,
    Value,
    BinaryData,
    Array,
    Map,
}

/// A single node of a Wexpr document.
///
/// `Invalid` stands for "no expression" — it is what parsing an empty
/// document yields, and it serializes to nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Expression {
    #[default]
    Invalid,
    Null,
    /// UTF-8 text. Written unquoted when possible, quoted otherwise.
    Value(String),
    /// Raw bytes. Written as `<Base64>` in text, as a raw payload in binary.
    BinaryData(Vec<u8>),
    /// Ordered children.
    Array(Vec<Expression>),
    /// Key/value pairs in insertion order. Keys are UTF-8 text.
    Map(Vec<(String, Expression)>),
}

impl Expression {
    /// The type tag of this expression.
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            Expression::Invalid => ExpressionType::Invalid,
            Expression::Null => ExpressionType::Null,
            Expression::Value(_) => ExpressionType::Value,
            Expression::BinaryData(_) => ExpressionType::BinaryData,
            Expression::Array(_) => ExpressionType::Array,
            Expression::Map(_) => ExpressionType::Map,
        }
    }

    /// Reset this expression to the empty form of the given type, dropping
    /// any current payload and children.
    pub fn change_type(&mut self, expression_type: ExpressionType) {
        *self = match expression_type {
            ExpressionType::Invalid => Expression::Invalid,
            ExpressionType::Null => Expression::Null,
            ExpressionType::Value => Expression::Value(String::new()),
            ExpressionType::BinaryData => Expression::BinaryData(Vec::new()),
            ExpressionType::Array => Expression::Array(Vec::new()),
            ExpressionType::Map => Expression::Map(Vec::new()),
        };
    }

    // --- Value ---

    /// The UTF-8 payload, or `None` if this is not a value.
    pub fn value(&self) -> Option<&str> {
        match self {
            Expression::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Replace the payload with the given text, turning this expression into
    /// a value if it is not one already.
    pub fn set_value(&mut self, value: impl Into<String>) {
        *self = Expression::Value(value.into());
    }

    // --- Binary data ---

    /// The raw byte payload, or `None` if this is not binary data.
    pub fn binary_data(&self) -> Option<&[u8]> {
        match self {
            Expression::BinaryData(data) => Some(data),
            _ => None,
        }
    }

    /// Replace the payload with the given bytes, turning this expression into
    /// binary data if it is not already.
    pub fn set_binary_data(&mut self, data: impl Into<Vec<u8>>) {
        *self = Expression::BinaryData(data.into());
    }

    // --- Array ---

    /// Number of children. 0 if this is not an array.
    pub fn array_count(&self) -> usize {
        match self {
            Expression::Array(children) => children.len(),
            _ => 0,
        }
    }

    /// The child at `index`, or `None` out of range or for non-arrays.
    pub fn array_at(&self, index: usize) -> Option<&Expression> {
        match self {
            Expression::Array(children) => children.get(index),
            _ => None,
        }
    }

    /// Mutable access to the child at `index`.
    pub fn array_at_mut(&mut self, index: usize) -> Option<&mut Expression> {
        match self {
            Expression::Array(children) => children.get_mut(index),
            _ => None,
        }
    }

    /// Append a child, taking ownership of it. Has no effect unless this
    /// expression is an array.
    pub fn array_append(&mut self, element: Expression) {
        if let Expression::Array(children) = self {
            children.push(element);
        }
    }

    // --- Map ---

    /// Number of key/value pairs. 0 if this is not a map.
    pub fn map_count(&self) -> usize {
        match self {
            Expression::Map(pairs) => pairs.len(),
            _ => 0,
        }
    }

    /// The key at `index` in insertion order.
    pub fn map_key_at(&self, index: usize) -> Option<&str> {
        match self {
            Expression::Map(pairs) => pairs.get(index).map(|(key, _)| key.as_str()),
            _ => None,
        }
    }

    /// The value at `index` in insertion order.
    pub fn map_value_at(&self, index: usize) -> Option<&Expression> {
        match self {
            Expression::Map(pairs) => pairs.get(index).map(|(_, value)| value),
            _ => None,
        }
    }

    /// The value bound to `key`, or `None` if absent or for non-maps.
    pub fn map_value_for_key(&self, key: &str) -> Option<&Expression> {
        match self {
            Expression::Map(pairs) => pairs
                .iter()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Mutable access to the value bound to `key`.
    pub fn map_value_for_key_mut(&mut self, key: &str) -> Option<&mut Expression> {
        match self {
            Expression::Map(pairs) => pairs
                .iter_mut()
                .find(|(existing, _)| existing == key)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Bind `value` to `key`, taking ownership of the value. An existing
    /// binding is replaced in place, keeping the key's original position;
    /// otherwise the pair is appended. Has no effect unless this expression
    /// is a map.
    pub fn map_set_value_for_key(&mut self, key: impl Into<String>, value: Expression) {
        if let Expression::Map(pairs) = self {
            let key = key.into();
            match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
        }
    }
}
