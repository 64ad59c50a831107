use veld_world::BiomeDefinition;

/// Shading description handed to the rendering collaborator: a base ground
/// color, a texture tiling scale, and the slope cosines where ground cover
/// blends from grass into bare rock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialDesc {
    pub base_color: [f32; 3],
    pub texture_tile: f32,
    pub slope_grass_max: f32,
    pub slope_rock_min: f32,
}

impl MaterialDesc {
    /// Neutral flat material used when a biome's shading parameters are
    /// unusable.
    pub const FALLBACK: MaterialDesc = MaterialDesc {
        base_color: [0.5, 0.5, 0.5],
        texture_tile: 0.25,
        slope_grass_max: 0.55,
        slope_rock_min: 0.8,
    };
}

/// Builds the chunk material from the biome's surface parameters, falling
/// back to [`MaterialDesc::FALLBACK`] when they are malformed.
pub fn material_for_biome(biome: &BiomeDefinition) -> MaterialDesc {
    let s = &biome.surface;
    let finite = s.base_color.iter().all(|c| c.is_finite())
        && s.texture_tile.is_finite()
        && s.slope_grass_max.is_finite()
        && s.slope_rock_min.is_finite();
    if !finite || s.texture_tile <= 0.0 {
        log::warn!(
            "biome {} has malformed surface parameters; using flat fallback material",
            biome.name
        );
        return MaterialDesc::FALLBACK;
    }
    MaterialDesc {
        base_color: s.base_color,
        texture_tile: s.texture_tile,
        slope_grass_max: s.slope_grass_max,
        slope_rock_min: s.slope_rock_min,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use veld_world::WorldGenParams;

    #[test]
    fn well_formed_surface_params_pass_through() {
        let params = WorldGenParams::default();
        let def = &params.biomes[0];
        let m = material_for_biome(def);
        assert_eq!(m.base_color, def.surface.base_color);
        assert_eq!(m.texture_tile, def.surface.texture_tile);
    }

    #[test]
    fn zero_texture_tile_falls_back() {
        let params = WorldGenParams::default();
        let mut def = (*params.biomes[0]).clone();
        def.surface.texture_tile = 0.0;
        assert_eq!(material_for_biome(&def), MaterialDesc::FALLBACK);
    }

    #[test]
    fn non_finite_color_falls_back() {
        let params = WorldGenParams::default();
        let mut def = (*params.biomes[0]).clone();
        def.surface.base_color[1] = f32::NAN;
        assert_eq!(material_for_biome(&def), MaterialDesc::FALLBACK);
    }
}
