// SPDX-License-Identifier: GPL-3.0-only

//! Live composition renderer
//!
//! Decides which stream feeds the main view and which feeds the inset, then
//! binds them to display surfaces. Planning is pure; applying the plan only
//! touches a surface when its bound stream or mirroring actually changes, so
//! re-rendering with unchanged inputs never restarts a video element.

use crate::backends::camera::{CameraStreamManager, FacingMode, StreamId, StreamPresence};
use crate::config::CameraSettings;
use tracing::debug;

/// Something a live stream can be shown on
pub trait DisplaySurface {
    /// Stream currently bound, if any
    fn bound_source(&self) -> Option<&StreamId>;

    fn bind(&mut self, source: StreamId);

    fn unbind(&mut self);

    fn is_mirrored(&self) -> bool;

    fn set_mirrored(&mut self, mirrored: bool);
}

/// One surface's assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub facing: FacingMode,
    pub mirrored: bool,
}

/// Assignments for the main view and the inset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingPlan {
    pub main: Option<Binding>,
    pub inset: Option<Binding>,
}

impl BindingPlan {
    pub fn has_main(&self) -> bool {
        self.main.is_some()
    }
}

/// Work out which stream goes where
///
/// Rules, first match wins:
/// 1. Mobile with both streams: main follows the effective main camera, the
///    other stream goes to the inset when it is enabled
/// 2. Only an environment stream: main shows it
/// 3. A user stream: main shows it
/// 4. Nothing bound
pub fn plan_bindings(
    presence: StreamPresence,
    is_mobile: bool,
    settings: &CameraSettings,
) -> BindingPlan {
    match (presence.user, presence.environment) {
        (true, true) if is_mobile => {
            let main = settings.effective_main_camera(is_mobile);
            let inset = main.opposite();
            BindingPlan {
                main: Some(Binding {
                    facing: main,
                    mirrored: main == FacingMode::User,
                }),
                inset: settings.show_inset.then_some(Binding {
                    facing: inset,
                    mirrored: inset == FacingMode::User && main == FacingMode::Environment,
                }),
            }
        }
        (false, true) => BindingPlan {
            main: Some(Binding {
                facing: FacingMode::Environment,
                mirrored: false,
            }),
            inset: None,
        },
        (true, _) => BindingPlan {
            main: Some(Binding {
                facing: FacingMode::User,
                mirrored: true,
            }),
            inset: None,
        },
        (false, false) => BindingPlan::default(),
    }
}

/// Bind one surface to its planned stream, touching it only on change
fn apply_binding<S: DisplaySurface>(
    surface: &mut S,
    binding: Option<Binding>,
    manager: &CameraStreamManager,
    role: &str,
) {
    let target = binding.and_then(|b| manager.stream(b.facing).map(|stream| (b, stream.id())));

    match target {
        Some((binding, id)) => {
            if surface.bound_source() != Some(id) {
                debug!(role, facing = %binding.facing, id = %id, "Binding stream to surface");
                surface.bind(id.clone());
            }
            if surface.is_mirrored() != binding.mirrored {
                surface.set_mirrored(binding.mirrored);
            }
        }
        None => {
            if surface.bound_source().is_some() {
                debug!(role, "Unbinding surface");
                surface.unbind();
            }
        }
    }
}

/// Apply `plan` to the main and inset surfaces
pub fn apply<S: DisplaySurface>(
    plan: &BindingPlan,
    manager: &CameraStreamManager,
    main_surface: &mut S,
    inset_surface: &mut S,
) {
    apply_binding(main_surface, plan.main, manager, "main");
    apply_binding(inset_surface, plan.inset, manager, "inset");
}

/// In-memory display surface
///
/// Records how often it was (re)bound, which is what the renderer's
/// idempotence is measured by.
#[derive(Debug, Clone, Default)]
pub struct VideoSurface {
    source: Option<StreamId>,
    mirrored: bool,
    bind_count: usize,
}

impl VideoSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_count(&self) -> usize {
        self.bind_count
    }
}

impl DisplaySurface for VideoSurface {
    fn bound_source(&self) -> Option<&StreamId> {
        self.source.as_ref()
    }

    fn bind(&mut self, source: StreamId) {
        self.source = Some(source);
        self.bind_count += 1;
    }

    fn unbind(&mut self) {
        self.source = None;
    }

    fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    fn set_mirrored(&mut self, mirrored: bool) {
        self.mirrored = mirrored;
    }
}

/// Main and inset surfaces plus the plan they currently show
#[derive(Debug, Default)]
pub struct LiveRenderer<S: DisplaySurface = VideoSurface> {
    main: S,
    inset: S,
    plan: BindingPlan,
}

impl<S: DisplaySurface> LiveRenderer<S> {
    pub fn new(main: S, inset: S) -> Self {
        Self {
            main,
            inset,
            plan: BindingPlan::default(),
        }
    }

    /// Re-plan from the manager's current streams and apply
    pub fn render(&mut self, manager: &CameraStreamManager, settings: &CameraSettings) -> BindingPlan {
        self.plan = plan_bindings(manager.presence(), manager.is_mobile(), settings);
        apply(&self.plan, manager, &mut self.main, &mut self.inset);
        self.plan
    }

    /// Plan applied by the last [`Self::render`]
    pub fn plan(&self) -> BindingPlan {
        self.plan
    }

    pub fn main_surface(&self) -> &S {
        &self.main
    }

    pub fn inset_surface(&self) -> &S {
        &self.inset
    }
}

/// Camera is usable: loaded, error-free, and something is on the main view
pub fn is_camera_ready(manager: &CameraStreamManager, plan: &BindingPlan) -> bool {
    !manager.is_loading() && manager.error().is_none() && plan.has_main()
}
