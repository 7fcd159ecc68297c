//! Value: runtime instances driven by tweens.
//! All numeric types use f32.

use serde::{Deserialize, Serialize};

/// Lightweight kind tag used as the value half of an evaluator key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Int,
    Vec2,
    Vec3,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Float => "Float",
            ValueKind::Int => "Int",
            ValueKind::Vec2 => "Vec2",
            ValueKind::Vec3 => "Vec3",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// Integer, interpolated then rounded
    Int(i32),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Int(_) => ValueKind::Int,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
        }
    }
}

/// Host types that can be driven by a tween.
pub trait Animatable: Sized + 'static {
    const KIND: ValueKind;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl Animatable for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl Animatable for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl Animatable for [f32; 2] {
    const KIND: ValueKind = ValueKind::Vec2;

    fn into_value(self) -> Value {
        Value::Vec2(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Vec2(v) => Some(*v),
            _ => None,
        }
    }
}

impl Animatable for [f32; 3] {
    const KIND: ValueKind = ValueKind::Vec3;

    fn into_value(self) -> Value {
        Value::Vec3(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(Value::Float(1.0).kind(), ValueKind::Float);
        assert_eq!(Value::Int(3).kind(), ValueKind::Int);
        assert_eq!(Value::Vec3([0.0; 3]).kind(), <[f32; 3]>::KIND);
    }

    #[test]
    fn from_value_rejects_other_kinds() {
        assert_eq!(f32::from_value(&Value::Float(2.5)), Some(2.5));
        assert_eq!(f32::from_value(&Value::Int(2)), None);
        assert_eq!(<[f32; 2]>::from_value(&Value::Vec2([1.0, 2.0])), Some([1.0, 2.0]));
    }

    #[test]
    fn value_json_shape() {
        let json = serde_json::to_value(Value::Vec2([1.0, 2.0])).unwrap();
        assert_eq!(json["type"], "Vec2");
        assert_eq!(json["data"][1], 2.0);
    }
}
