use binrw::binrw;
use cgmath::{Quaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Quantization scale for one [`DtsQuat16`] component: the full positive
/// range of an i16 maps to 1.0.
pub const QUAT16_UNIT: f32 = 32767.0;

#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsPoint3(
    #[br(map = |raw: [f32; 3]| Vector3::new(raw[0], raw[1], raw[2]))]
    #[bw(map = |v: &Vector3<f32>| [v.x, v.y, v.z])]
    pub Vector3<f32>,
);

impl DtsPoint3 {
    pub const SIZE: usize = 12;

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        DtsPoint3(Vector3::new(x, y, z))
    }

    pub fn to_slice(&self) -> [f32; 3] {
        let v = &self.0;
        [v.x, v.y, v.z]
    }
}

impl Default for DtsPoint3 {
    fn default() -> Self {
        DtsPoint3::new(0.0, 0.0, 0.0)
    }
}

/// Axis-aligned bounding box, stored as min/max corners.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsBox3 {
    pub min: DtsPoint3,
    pub max: DtsPoint3,
}

impl DtsBox3 {
    pub const SIZE: usize = 2 * DtsPoint3::SIZE;
}

/// Quaternion quantized to four signed 16-bit components.
///
/// The stored values are the raw wire integers; [`DtsQuat16::decode`] maps
/// them back to a float quaternion. Writers are expected to quantize unit
/// quaternions, so the decoded magnitude is within rounding error of 1 and
/// no re-normalization is applied.
#[binrw]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsQuat16 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
    pub w: i16,
}

impl DtsQuat16 {
    pub const SIZE: usize = 8;

    pub fn decode(&self) -> Quaternion<f32> {
        Quaternion::new(
            self.w as f32 / QUAT16_UNIT,
            self.x as f32 / QUAT16_UNIT,
            self.y as f32 / QUAT16_UNIT,
            self.z as f32 / QUAT16_UNIT,
        )
    }

    pub fn from_quaternion(q: &Quaternion<f32>) -> Self {
        let quantize =
            |c: f32| (c * QUAT16_UNIT).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        DtsQuat16 {
            x: quantize(q.v.x),
            y: quantize(q.v.y),
            z: quantize(q.v.z),
            w: quantize(q.s),
        }
    }
}
