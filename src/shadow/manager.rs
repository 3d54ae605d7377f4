//! Shadow manager
//!
//! Applies shadow settings to a shadowed scene, switches between indoor and
//! outdoor casting masks and produces matching shader defines.

use super::defines;
use super::layout::ShadowUnitLayout;
use super::scene::{ShadowedScene, SharedShadowedScene};
use super::settings::{ComputeNearFarMode, MultipleShadowMapHint};
use super::suppress;
use super::technique::{CascadedShadowTechnique, ShadowTechnique};
use super::{keys, SECTION};
use crate::scene::{Group, Node, SharedGroup, StateSet, NODE_MASK_ALL};
use crate::settings::{SettingsChanges, SettingsProvider};
use crate::shader::DefineMap;
use glam::UVec2;

/// Which casting mask is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowMode {
    /// Objects matching the outdoor mask cast shadows.
    Outdoor,
    /// Objects matching the indoor mask cast shadows, if indoor shadows are on.
    Indoor,
}

/// Drives a shadowed scene from settings.
///
/// The manager owns the shadowed scene and shares it with the root node it
/// was attached to.
#[derive(Debug)]
pub struct ShadowManager<P: SettingsProvider> {
    settings: P,
    shadowed_scene: SharedShadowedScene,
    outdoor_shadow_casting_mask: u32,
    indoor_shadow_casting_mask: u32,
    enable_shadows: bool,
    mode: ShadowMode,
}

impl<P: SettingsProvider> ShadowManager<P> {
    /// Create a manager with a [`CascadedShadowTechnique`].
    ///
    /// `scene_root` becomes the child of a new shadowed scene, which is
    /// attached under `root_node`. Settings are applied and outdoor mode is
    /// entered.
    pub fn new(
        settings: P,
        scene_root: SharedGroup,
        root_node: &mut Group,
        outdoor_shadow_casting_mask: u32,
        indoor_shadow_casting_mask: u32,
    ) -> Self {
        Self::with_technique(
            settings,
            Box::new(CascadedShadowTechnique::new()),
            scene_root,
            root_node,
            outdoor_shadow_casting_mask,
            indoor_shadow_casting_mask,
        )
    }

    /// Create a manager driving `technique`.
    pub fn with_technique(
        settings: P,
        technique: Box<dyn ShadowTechnique>,
        scene_root: SharedGroup,
        root_node: &mut Group,
        outdoor_shadow_casting_mask: u32,
        indoor_shadow_casting_mask: u32,
    ) -> Self {
        let mut shadowed_scene = ShadowedScene::new(technique);
        shadowed_scene.add_child(Node::Group(scene_root));
        let shadowed_scene = shadowed_scene.into_shared();
        root_node.add_child(Node::ShadowedScene(shadowed_scene.clone()));

        let mut manager = Self {
            settings,
            shadowed_scene,
            outdoor_shadow_casting_mask,
            indoor_shadow_casting_mask,
            enable_shadows: false,
            mode: ShadowMode::Outdoor,
        };
        manager.setup_shadow_settings();
        manager.enable_outdoor_mode();
        manager
    }

    /// Read the shadow settings and apply them to the technique.
    ///
    /// When shadows are disabled nothing but the master switch is read.
    pub fn setup_shadow_settings(&mut self) {
        let settings = &self.settings;
        self.enable_shadows = settings.get_bool(SECTION, keys::ENABLE_SHADOWS);

        let mut scene = self.shadowed_scene.borrow_mut();
        if !self.enable_shadows {
            scene.technique_mut().disable_shadows();
            return;
        }

        scene.technique_mut().enable_shadows();

        let layout = ShadowUnitLayout::from_settings(settings);
        let shadow_settings = scene.shadow_settings_mut();
        shadow_settings.light_num = 0;
        shadow_settings.receives_shadow_traversal_mask = NODE_MASK_ALL;
        shadow_settings.num_shadow_maps_per_light = layout.num_shadow_maps();
        shadow_settings.base_shadow_texture_unit = layout.base_texture_unit();

        shadow_settings.minimum_shadow_map_near_far_ratio =
            settings.get_float(SECTION, keys::MINIMUM_LISPSM_NEAR_FAR_RATIO);
        shadow_settings.compute_near_far_mode_override =
            if settings.get_bool(SECTION, keys::COMPUTE_TIGHT_SCENE_BOUNDS) {
                ComputeNearFarMode::UsingPrimitives
            } else {
                ComputeNearFarMode::UsingBoundingVolumes
            };

        // Negative resolutions wrap, as the technique expects unsigned sizes
        let resolution = settings.get_int(SECTION, keys::SHADOW_MAP_RESOLUTION);
        shadow_settings.texture_size = UVec2::splat(resolution as u32);

        shadow_settings.multiple_shadow_map_hint =
            if settings.get_bool(SECTION, keys::ALLOW_SHADOW_MAP_OVERLAP) {
                MultipleShadowMapHint::Cascaded
            } else {
                MultipleShadowMapHint::ParallelSplit
            };

        tracing::debug!(
            "Shadow maps: {} per light from unit {}, {}x{} texels, {}",
            layout.num_shadow_maps(),
            layout.base_texture_unit(),
            resolution,
            resolution,
            shadow_settings.multiple_shadow_map_hint
        );

        let technique = scene.technique_mut();
        technique.set_split_point_uniform_logarithmic_ratio(
            settings.get_float(SECTION, keys::SPLIT_POINT_UNIFORM_LOGARITHMIC_RATIO),
        );
        technique.set_split_point_delta_bias(settings.get_float(SECTION, keys::SPLIT_POINT_BIAS));

        if settings.get_bool(SECTION, keys::ENABLE_DEBUG_HUD) {
            technique.enable_debug_hud();
        } else {
            technique.disable_debug_hud();
        }
    }

    /// Make `state_set` render unshadowed regardless of the scene's settings.
    pub fn disable_shadows_for_state_set(&self, state_set: &mut StateSet) {
        suppress::disable_shadows_for_state_set(&self.settings, state_set);
    }

    /// Defines matching the active shadow configuration.
    ///
    /// Regenerate after every settings change; shader variants are keyed by
    /// these defines.
    pub fn shadow_defines(&self) -> DefineMap {
        if !self.enable_shadows {
            return Self::shadows_disabled_defines();
        }

        let debug_overlay = self.settings.get_bool(SECTION, keys::ENABLE_DEBUG_OVERLAY);
        let scene = self.shadowed_scene.borrow();
        defines::shadows_enabled_defines(scene.shadow_settings(), debug_overlay)
    }

    /// Defines for shaders compiled with shadows off.
    pub fn shadows_disabled_defines() -> DefineMap {
        defines::shadows_disabled_defines()
    }

    /// Cast shadows from the indoor mask, or stop casting if indoor shadows are off.
    pub fn enable_indoor_mode(&mut self) {
        self.mode = ShadowMode::Indoor;

        let mut scene = self.shadowed_scene.borrow_mut();
        if self.settings.get_bool(SECTION, keys::ENABLE_INDOOR_SHADOWS) {
            scene.shadow_settings_mut().casts_shadow_traversal_mask =
                self.indoor_shadow_casting_mask;
        } else {
            scene.technique_mut().disable_shadows();
        }
    }

    /// Cast shadows from the outdoor mask, re-enabling shadows if configured.
    pub fn enable_outdoor_mode(&mut self) {
        self.mode = ShadowMode::Outdoor;

        let mut scene = self.shadowed_scene.borrow_mut();
        if self.enable_shadows {
            scene.technique_mut().enable_shadows();
        }
        scene.shadow_settings_mut().casts_shadow_traversal_mask = self.outdoor_shadow_casting_mask;
    }

    /// Reapply settings after `changes`, staying in the current mode.
    ///
    /// Returns `true` if shadow settings changed and defines must be
    /// regenerated.
    pub fn process_changed_settings(&mut self, changes: &SettingsChanges) -> bool {
        if !changes.iter().any(|(section, _)| section == SECTION) {
            return false;
        }

        tracing::debug!("Reapplying shadow settings");
        self.setup_shadow_settings();
        match self.mode {
            ShadowMode::Outdoor => self.enable_outdoor_mode(),
            ShadowMode::Indoor => self.enable_indoor_mode(),
        }
        true
    }

    /// Whether shadows are enabled in the settings last applied.
    pub fn shadows_enabled(&self) -> bool {
        self.enable_shadows
    }

    /// The active mode.
    pub fn mode(&self) -> ShadowMode {
        self.mode
    }

    /// The shadowed scene.
    pub fn shadowed_scene(&self) -> &SharedShadowedScene {
        &self.shadowed_scene
    }

    /// The settings provider.
    pub fn settings(&self) -> &P {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::core::StateMode;
    use crate::settings::Settings;
    use crate::shadow::defines::{
        SHADOWS_ENABLED, SHADOW_MAPS_OVERLAP, SHADOW_TEXTURE_UNIT_LIST, USE_SHADOW_DEBUG_OVERLAY,
    };

    const OUTDOOR_MASK: u32 = 0b0110;
    const INDOOR_MASK: u32 = 0b0010;

    fn build_manager(user: &str) -> (ShadowManager<Settings>, Group) {
        let settings = Settings::from_user_toml(user).unwrap();
        let scene_root = Group::new("scene root").into_shared();
        let mut root = Group::new("root");
        let manager = ShadowManager::new(settings, scene_root, &mut root, OUTDOOR_MASK, INDOOR_MASK);
        (manager, root)
    }

    fn enabled(extra: &str) -> String {
        format!("[Shadows]\n\"enable shadows\" = true\n{extra}")
    }

    fn technique_enabled<P: SettingsProvider>(manager: &ShadowManager<P>) -> bool {
        manager.shadowed_scene().borrow().technique().shadows_enabled()
    }

    fn casting_mask<P: SettingsProvider>(manager: &ShadowManager<P>) -> u32 {
        manager
            .shadowed_scene()
            .borrow()
            .shadow_settings()
            .casts_shadow_traversal_mask
    }

    #[test]
    fn test_scene_attached_under_root() {
        let settings = Settings::new().unwrap();
        let scene_root = Group::new("scene root").into_shared();
        let mut root = Group::new("root");
        let manager = ShadowManager::new(settings, Rc::clone(&scene_root), &mut root, 1, 2);

        let attached = root.children()[0].as_shadowed_scene().unwrap();
        assert!(Rc::ptr_eq(attached, manager.shadowed_scene()));

        let scene = attached.borrow();
        let wrapped = scene.children()[0].as_group().unwrap();
        assert!(Rc::ptr_eq(wrapped, &scene_root));
    }

    #[test]
    fn test_disabled_touches_nothing_else() {
        let (manager, _root) = build_manager(
            r#"
            [Shadows]
            "enable shadows" = false
            "number of shadow maps" = 4
            "shadow map resolution" = 4096
            "enable debug hud" = true
            "#,
        );

        assert!(!manager.shadows_enabled());
        assert!(!technique_enabled(&manager));

        let scene = manager.shadowed_scene().borrow();
        let defaults = crate::shadow::ShadowSettings::default();
        let applied = scene.shadow_settings();
        assert_eq!(applied.num_shadow_maps_per_light, defaults.num_shadow_maps_per_light);
        assert_eq!(applied.texture_size, defaults.texture_size);
        assert_eq!(applied.light_num, -1);
        assert!(!scene.technique().debug_hud_enabled());
    }

    #[test]
    fn test_enabled_applies_everything() {
        let (manager, _root) = build_manager(&enabled(
            r#"
            "number of shadow maps" = 3
            "minimum lispsm near far ratio" = 0.125
            "compute tight scene bounds" = true
            "shadow map resolution" = 2048
            "split point uniform logarithmic ratio" = 0.75
            "split point bias" = 10.0
            "allow shadow map overlap" = false
            "enable debug hud" = true
            "#,
        ));

        assert!(technique_enabled(&manager));
        let scene = manager.shadowed_scene().borrow();
        let applied = scene.shadow_settings();
        assert_eq!(applied.light_num, 0);
        assert_eq!(applied.receives_shadow_traversal_mask, !0);
        assert_eq!(applied.num_shadow_maps_per_light, 3);
        assert_eq!(applied.base_shadow_texture_unit, 5);
        assert_eq!(applied.minimum_shadow_map_near_far_ratio, 0.125);
        assert_eq!(applied.compute_near_far_mode_override, ComputeNearFarMode::UsingPrimitives);
        assert_eq!(applied.texture_size, UVec2::new(2048, 2048));
        assert_eq!(applied.multiple_shadow_map_hint, MultipleShadowMapHint::ParallelSplit);

        let technique = scene.technique();
        assert_eq!(technique.split_point_uniform_logarithmic_ratio(), 0.75);
        assert_eq!(technique.split_point_delta_bias(), 10.0);
        assert!(technique.debug_hud_enabled());
    }

    #[test]
    fn test_disabled_defines_ignore_other_settings() {
        let (manager, _root) = build_manager(
            r#"
            [Shadows]
            "enable shadows" = false
            "number of shadow maps" = 4
            "allow shadow map overlap" = true
            "enable debug overlay" = true
            "#,
        );

        assert_eq!(
            manager.shadow_defines(),
            ShadowManager::<Settings>::shadows_disabled_defines()
        );
    }

    #[test]
    fn test_unit_list_per_map_count() {
        let expected = ["0", "0,1", "0,1,2", "0,1,2,3"];
        for (n, list) in (1..=4).zip(expected) {
            let (manager, _root) = build_manager(&enabled(&format!("\"number of shadow maps\" = {n}")));
            let defines = manager.shadow_defines();
            assert_eq!(defines[SHADOWS_ENABLED], "1");
            assert_eq!(defines[SHADOW_TEXTURE_UNIT_LIST], list);
        }
    }

    #[test]
    fn test_applier_and_suppression_agree_on_units() {
        for n in 1..=4 {
            let (manager, _root) = build_manager(&enabled(&format!("\"number of shadow maps\" = {n}")));

            let base = manager
                .shadowed_scene()
                .borrow()
                .shadow_settings()
                .base_shadow_texture_unit;
            assert_eq!(base, 8 - n);

            let mut state_set = StateSet::new();
            manager.disable_shadows_for_state_set(&mut state_set);
            let units: Vec<i32> = state_set.texture_units().map(|u| u as i32).collect();
            assert_eq!(units, (base..8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_suppression_works_with_shadows_off() {
        let (manager, _root) = build_manager("[Shadows]\n\"number of shadow maps\" = 2");

        let mut state_set = StateSet::new();
        manager.disable_shadows_for_state_set(&mut state_set);
        let binding = state_set.texture_attribute(6).unwrap();
        assert_eq!(binding.mode, StateMode::ON | StateMode::OVERRIDE | StateMode::PROTECTED);
        assert_eq!(binding.texture.image().texel(0, 0), Some(f32::INFINITY));
    }

    #[test]
    fn test_overlap_define_moves_with_hint() {
        for (overlap, flag, hint) in [(true, "1", "cascaded"), (false, "0", "parallel-split")] {
            let (manager, _root) =
                build_manager(&enabled(&format!("\"allow shadow map overlap\" = {overlap}")));

            assert_eq!(manager.shadow_defines()[SHADOW_MAPS_OVERLAP], flag);
            let scene = manager.shadowed_scene().borrow();
            assert_eq!(scene.shadow_settings().multiple_shadow_map_hint.to_string(), hint);
        }
    }

    #[test]
    fn test_debug_overlay_define() {
        let (manager, _root) = build_manager(&enabled("\"enable debug overlay\" = true"));
        assert_eq!(manager.shadow_defines()[USE_SHADOW_DEBUG_OVERLAY], "1");

        let (manager, _root) = build_manager(&enabled("\"enable debug overlay\" = false"));
        assert_eq!(manager.shadow_defines()[USE_SHADOW_DEBUG_OVERLAY], "0");
    }

    #[test]
    fn test_construction_enters_outdoor_mode() {
        let (manager, _root) = build_manager(&enabled(""));
        assert_eq!(manager.mode(), ShadowMode::Outdoor);
        assert_eq!(casting_mask(&manager), OUTDOOR_MASK);
    }

    #[test]
    fn test_outdoor_mode_with_shadows_off() {
        let (mut manager, _root) = build_manager("[Shadows]\n\"enable shadows\" = false");
        manager.enable_indoor_mode();
        assert_eq!(casting_mask(&manager), INDOOR_MASK);

        manager.enable_outdoor_mode();
        assert!(!technique_enabled(&manager));
        assert_eq!(casting_mask(&manager), OUTDOOR_MASK);
    }

    #[test]
    fn test_indoor_mode_without_indoor_shadows() {
        let (mut manager, _root) = build_manager(&enabled("\"enable indoor shadows\" = false"));
        assert!(technique_enabled(&manager));

        manager.enable_indoor_mode();
        assert!(!technique_enabled(&manager));
        // Mask untouched
        assert_eq!(casting_mask(&manager), OUTDOOR_MASK);

        // Stays disabled when already disabled
        manager.enable_indoor_mode();
        assert!(!technique_enabled(&manager));

        // Outdoors re-enables
        manager.enable_outdoor_mode();
        assert!(technique_enabled(&manager));
    }

    #[test]
    fn test_indoor_mode_with_indoor_shadows() {
        let (mut manager, _root) = build_manager(&enabled("\"enable indoor shadows\" = true"));

        manager.enable_indoor_mode();
        assert_eq!(manager.mode(), ShadowMode::Indoor);
        assert!(technique_enabled(&manager));
        assert_eq!(casting_mask(&manager), INDOOR_MASK);
    }

    #[test]
    fn test_process_changed_settings() {
        let settings = Rc::new(RefCell::new(Settings::new().unwrap()));
        let scene_root = Group::new("scene root").into_shared();
        let mut root = Group::new("root");
        let mut manager = ShadowManager::new(
            Rc::clone(&settings),
            scene_root,
            &mut root,
            OUTDOOR_MASK,
            INDOOR_MASK,
        );
        assert_eq!(manager.shadow_defines()[SHADOWS_ENABLED], "0");

        {
            let mut settings = settings.borrow_mut();
            settings.set_bool("Shadows", "enable shadows", true).unwrap();
            settings.set_int("Shadows", "number of shadow maps", 2).unwrap();
        }
        let changes = settings.borrow_mut().take_changes();
        assert!(manager.process_changed_settings(&changes));
        assert!(technique_enabled(&manager));

        let defines = manager.shadow_defines();
        assert_eq!(defines[SHADOWS_ENABLED], "1");
        assert_eq!(defines[SHADOW_TEXTURE_UNIT_LIST], "0,1");
    }

    #[test]
    fn test_process_changes_keeps_indoor_mode() {
        let settings = Rc::new(RefCell::new(
            Settings::from_user_toml(&enabled("\"enable indoor shadows\" = false")).unwrap(),
        ));
        let mut root = Group::new("root");
        let mut manager = ShadowManager::new(
            Rc::clone(&settings),
            Group::new("scene root").into_shared(),
            &mut root,
            OUTDOOR_MASK,
            INDOOR_MASK,
        );
        manager.enable_indoor_mode();
        assert!(!technique_enabled(&manager));

        settings
            .borrow_mut()
            .set_int("Shadows", "shadow map resolution", 512)
            .unwrap();
        let changes = settings.borrow_mut().take_changes();
        assert!(manager.process_changed_settings(&changes));

        // Reapplying enables the technique, re-entering indoor mode disables it again
        assert_eq!(manager.mode(), ShadowMode::Indoor);
        assert!(!technique_enabled(&manager));
    }

    #[test]
    fn test_unrelated_changes_ignored() {
        let (mut manager, _root) = build_manager("");
        let mut changes = SettingsChanges::new();
        changes.insert(("Water".to_string(), "reflection detail".to_string()));

        assert!(!manager.process_changed_settings(&changes));
    }

    /// Settings that remember which keys were read.
    struct RecordingSettings {
        inner: Settings,
        reads: RefCell<Vec<String>>,
    }

    impl RecordingSettings {
        fn new(user: &str) -> Self {
            Self {
                inner: Settings::from_user_toml(user).unwrap(),
                reads: RefCell::new(Vec::new()),
            }
        }

        fn take_reads(&self) -> Vec<String> {
            std::mem::take(&mut *self.reads.borrow_mut())
        }
    }

    impl SettingsProvider for RecordingSettings {
        fn get_bool(&self, section: &str, key: &str) -> bool {
            self.reads.borrow_mut().push(key.to_string());
            self.inner.get_bool(section, key)
        }

        fn get_int(&self, section: &str, key: &str) -> i32 {
            self.reads.borrow_mut().push(key.to_string());
            self.inner.get_int(section, key)
        }

        fn get_float(&self, section: &str, key: &str) -> f32 {
            self.reads.borrow_mut().push(key.to_string());
            self.inner.get_float(section, key)
        }
    }

    #[test]
    fn test_disabled_reads_only_master_switch() {
        let settings = RecordingSettings::new("[Shadows]\n\"enable shadows\" = false");
        let mut root = Group::new("root");
        let mut manager = ShadowManager::new(
            settings,
            Group::new("scene root").into_shared(),
            &mut root,
            OUTDOOR_MASK,
            INDOOR_MASK,
        );
        assert_eq!(manager.settings().take_reads(), vec![keys::ENABLE_SHADOWS]);

        manager.setup_shadow_settings();
        assert_eq!(manager.settings().take_reads(), vec![keys::ENABLE_SHADOWS]);
    }

    #[test]
    fn test_enabled_reads_every_applied_key() {
        let settings = RecordingSettings::new(&enabled(""));
        let mut root = Group::new("root");
        let manager = ShadowManager::new(
            settings,
            Group::new("scene root").into_shared(),
            &mut root,
            OUTDOOR_MASK,
            INDOOR_MASK,
        );

        let reads = manager.settings().take_reads();
        assert_eq!(reads.first().map(String::as_str), Some(keys::ENABLE_SHADOWS));
        for key in [
            keys::NUMBER_OF_SHADOW_MAPS,
            keys::MINIMUM_LISPSM_NEAR_FAR_RATIO,
            keys::COMPUTE_TIGHT_SCENE_BOUNDS,
            keys::SHADOW_MAP_RESOLUTION,
            keys::SPLIT_POINT_UNIFORM_LOGARITHMIC_RATIO,
            keys::SPLIT_POINT_BIAS,
            keys::ALLOW_SHADOW_MAP_OVERLAP,
            keys::ENABLE_DEBUG_HUD,
        ] {
            assert!(reads.iter().any(|read| read == key), "'{key}' not read");
        }
    }
}
