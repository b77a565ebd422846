use std::fmt;

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};

use super::category::{Category, HAND_POINTS};

/// One key point. Either all three coordinates are present or none are.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LandmarkPoint(Option<[f32; 3]>);

impl LandmarkPoint {
    pub const ABSENT: LandmarkPoint = LandmarkPoint(None);

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self(Some([x, y, z]))
    }

    pub fn coords(&self) -> Option<[f32; 3]> {
        self.0
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl From<[f32; 3]> for LandmarkPoint {
    fn from(coords: [f32; 3]) -> Self {
        Self(Some(coords))
    }
}

// Absent points are written as [null, null, null].
impl Serialize for LandmarkPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        match self.0 {
            Some(coords) => {
                for c in coords {
                    tuple.serialize_element(&c)?;
                }
            }
            None => {
                for _ in 0..3 {
                    tuple.serialize_element(&Option::<f32>::None)?;
                }
            }
        }
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for LandmarkPoint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PointVisitor;

        impl<'de> Visitor<'de> for PointVisitor {
            type Value = LandmarkPoint;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a list of three numbers or three nulls")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<LandmarkPoint, A::Error> {
                let mut coords = [None; 3];
                for (i, slot) in coords.iter_mut().enumerate() {
                    *slot = seq
                        .next_element::<Option<f32>>()?
                        .ok_or_else(|| de::Error::invalid_length(i, &self))?;
                }
                if seq.next_element::<de::IgnoredAny>()?.is_some() {
                    return Err(de::Error::invalid_length(4, &self));
                }

                match coords {
                    [Some(x), Some(y), Some(z)] => Ok(LandmarkPoint::new(x, y, z)),
                    [None, None, None] => Ok(LandmarkPoint::ABSENT),
                    _ => Err(de::Error::custom("partially absent landmark point")),
                }
            }
        }

        deserializer.deserialize_tuple(3, PointVisitor)
    }
}

// Non-finite values serialize as null and would leave a partially absent point.
pub fn all_finite(coords: &[[f32; 3]]) -> bool {
    coords.iter().flatten().all(|c| c.is_finite())
}

#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    category: Category,
    points: Vec<LandmarkPoint>,
}

impl LandmarkSet {
    pub fn placeholder(category: Category) -> Self {
        Self {
            category,
            points: vec![LandmarkPoint::ABSENT; category.point_count()],
        }
    }

    pub fn resolved(category: Category, coords: &[[f32; 3]]) -> Option<Self> {
        if coords.len() != category.point_count() || !all_finite(coords) {
            return None;
        }
        Some(Self {
            category,
            points: coords.iter().copied().map(LandmarkPoint::from).collect(),
        })
    }

    pub fn hands(left: Option<&[[f32; 3]]>, right: Option<&[[f32; 3]]>) -> Self {
        let mut points = Vec::with_capacity(Category::Hands.point_count());
        for block in [left, right] {
            match block {
                Some(coords) if coords.len() == HAND_POINTS && all_finite(coords) => {
                    points.extend(coords.iter().copied().map(LandmarkPoint::from))
                }
                _ => points.extend(std::iter::repeat(LandmarkPoint::ABSENT).take(HAND_POINTS)),
            }
        }
        Self {
            category: Category::Hands,
            points,
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.points.iter().all(LandmarkPoint::is_absent)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameRecord {
    points: Vec<LandmarkPoint>,
}

impl FrameRecord {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, set: LandmarkSet) {
        self.points.extend(set.points);
    }

    pub fn points(&self) -> &[LandmarkPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoLandmarks {
    frames: Vec<FrameRecord>,
}

impl VideoLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: FrameRecord) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn into_flat(self) -> Vec<LandmarkPoint> {
        self.frames.into_iter().flat_map(|f| f.points).collect()
    }
}
