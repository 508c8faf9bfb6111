use std::io::{Read, Seek, Write};

use binrw::{binrw, BinRead, BinResult, BinWrite, Endian};
use serde::{Deserialize, Serialize};

use super::{fill_slot, read_seq, string_from_slot};
use crate::error::{raise, DtsError};

/// Fixed byte width of the material map-file slot.
pub const DTS_MAX_MAP_FILE: usize = 32;

pub const MAT_KIND_MASK: i32 = 0x0F;
pub const MAT_SHADING_MASK: i32 = 0xF00;
pub const MAT_TEXTURE_MASK: i32 = 0xF000;

/// Low nibble of the material flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtsMaterialKind {
    Null,
    Palette,
    Rgb,
    Texture,
}

impl DtsMaterialKind {
    pub fn from_flags(flags: i32) -> Option<Self> {
        match flags & MAT_KIND_MASK {
            0x00 => Some(DtsMaterialKind::Null),
            0x01 => Some(DtsMaterialKind::Palette),
            0x02 => Some(DtsMaterialKind::Rgb),
            0x03 => Some(DtsMaterialKind::Texture),
            _ => None,
        }
    }
}

/// Shading nibble of the material flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtsShading {
    None,
    Flat,
    Smooth,
}

impl DtsShading {
    pub fn from_flags(flags: i32) -> Option<Self> {
        match flags & MAT_SHADING_MASK {
            0x100 => Some(DtsShading::None),
            0x200 => Some(DtsShading::Flat),
            0x300 => Some(DtsShading::Smooth),
            _ => None,
        }
    }
}

/// Texture-transparency nibble of the material flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtsTransparency {
    Transparent,
    Translucent,
}

impl DtsTransparency {
    pub fn from_flags(flags: i32) -> Option<Self> {
        match flags & MAT_TEXTURE_MASK {
            0x1000 => Some(DtsTransparency::Transparent),
            0x2000 => Some(DtsTransparency::Translucent),
            _ => None,
        }
    }
}

/// Physical surface kind; drives elasticity/friction semantics in the
/// consuming engine only.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DtsSurface {
    Default = 0x0,
    Concrete = 0x1,
    Carpet = 0x2,
    Metal = 0x3,
    Glass = 0x4,
    Plastic = 0x5,
    Wood = 0x6,
    Marble = 0x7,
    Snow = 0x8,
    Ice = 0x9,
    Sand = 0xA,
    Mud = 0xB,
    Stone = 0xC,
    SoftEarth = 0xD,
    PackedEarth = 0xE,
}

impl DtsSurface {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0x0 => Some(DtsSurface::Default),
            0x1 => Some(DtsSurface::Concrete),
            0x2 => Some(DtsSurface::Carpet),
            0x3 => Some(DtsSurface::Metal),
            0x4 => Some(DtsSurface::Glass),
            0x5 => Some(DtsSurface::Plastic),
            0x6 => Some(DtsSurface::Wood),
            0x7 => Some(DtsSurface::Marble),
            0x8 => Some(DtsSurface::Snow),
            0x9 => Some(DtsSurface::Ice),
            0xA => Some(DtsSurface::Sand),
            0xB => Some(DtsSurface::Mud),
            0xC => Some(DtsSurface::Stone),
            0xD => Some(DtsSurface::SoftEarth),
            0xE => Some(DtsSurface::PackedEarth),
            _ => None,
        }
    }
}

/// One fixed 64-byte material record.
///
/// `flags` and `surface_type` are kept raw so unknown values survive a
/// round-trip; the nibble accessors decode the documented ranges.
#[binrw]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[brw(little)]
pub struct DtsMaterial {
    pub flags: i32,
    pub alpha: f32,
    pub index: i32,
    pub color_r: u8,
    pub color_g: u8,
    pub color_b: u8,
    pub color_flags: u8,
    #[br(map = |raw: [u8; DTS_MAX_MAP_FILE]| string_from_slot(&raw))]
    #[bw(map = |name: &String| fill_slot::<DTS_MAX_MAP_FILE>(name))]
    pub map_file: String,
    pub surface_type: i32,
    pub elasticity: f32,
    pub friction: f32,
    pub use_default_props: u32,
}

impl DtsMaterial {
    pub const SIZE: usize = 64;

    pub fn kind(&self) -> Option<DtsMaterialKind> {
        DtsMaterialKind::from_flags(self.flags)
    }

    pub fn shading(&self) -> Option<DtsShading> {
        DtsShading::from_flags(self.flags)
    }

    pub fn transparency(&self) -> Option<DtsTransparency> {
        DtsTransparency::from_flags(self.flags)
    }

    pub fn surface(&self) -> Option<DtsSurface> {
        DtsSurface::from_raw(self.surface_type)
    }

    pub fn uses_default_props(&self) -> bool {
        self.use_default_props != 0
    }
}

/// The flat detail-by-material grid trailing a shape.
///
/// Logically two-dimensional: one row of `material_count` materials per
/// level of detail. Both counts are stored because neither is derivable
/// from the flat length alone; encode checks the grid shape instead of
/// trusting it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DtsMaterialList {
    pub detail_count: i32,
    pub material_count: i32,
    pub materials_list: Vec<DtsMaterial>,
}

impl BinRead for DtsMaterialList {
    type Args<'a> = ();

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<Self> {
        let pos = reader.stream_position()?;
        let detail_count = i32::read_options(reader, endian, ())?;
        let material_count = i32::read_options(reader, endian, ())?;
        let total = grid_len(detail_count, material_count)
            .ok_or_else(|| raise(pos, invalid_grid(detail_count, material_count)))?;
        let materials_list = read_seq(reader, endian, total)?;
        Ok(DtsMaterialList {
            detail_count,
            material_count,
            materials_list,
        })
    }
}

impl BinWrite for DtsMaterialList {
    type Args<'a> = ();

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: Endian,
        _args: Self::Args<'_>,
    ) -> BinResult<()> {
        let pos = writer.stream_position()?;
        if grid_len(self.detail_count, self.material_count) != Some(self.materials_list.len()) {
            return Err(raise(
                pos,
                invalid_grid(self.detail_count, self.material_count),
            ));
        }
        self.detail_count.write_options(writer, endian, ())?;
        self.material_count.write_options(writer, endian, ())?;
        for material in &self.materials_list {
            material.write_options(writer, endian, ())?;
        }
        Ok(())
    }
}

impl DtsMaterialList {
    /// Exact encoded byte size of the material list payload.
    pub fn size(&self) -> usize {
        2 * 4 + self.materials_list.len() * DtsMaterial::SIZE
    }

    /// The material for one detail level and material slot (row-major).
    pub fn material(&self, detail: usize, slot: usize) -> Option<&DtsMaterial> {
        let material_count = usize::try_from(self.material_count).ok()?;
        if slot >= material_count {
            return None;
        }
        let index = detail.checked_mul(material_count)?.checked_add(slot)?;
        self.materials_list.get(index)
    }
}

fn grid_len(detail_count: i32, material_count: i32) -> Option<usize> {
    let details = usize::try_from(detail_count).ok()?;
    let materials = usize::try_from(material_count).ok()?;
    details.checked_mul(materials)
}

fn invalid_grid(detail_count: i32, material_count: i32) -> DtsError {
    DtsError::InvalidMaterialListShape {
        detail_count,
        material_count,
    }
}
