// --- File: draw_list.rs ---
use crate::config::FeatureToggles;
use crate::pipelines::Technique;
use crate::scene::{ItemKind, Placed};
use crate::simulation::lasers::LaserInstance;
use crate::simulation::light_rays::LightRay;
use crate::uniforms::ObjectUniform;
use glam::Mat4;

/// One recorded draw. `slot` indexes the frame's object uniform blocks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Item {
        technique: Technique,
        item: usize,
        slot: u32,
    },
    Fish {
        group: usize,
        instances: u32,
    },
    Bubbles {
        instances: u32,
    },
    Laser {
        slot: u32,
    },
    LightRay {
        slot: u32,
    },
}

impl DrawCommand {
    pub fn technique(&self) -> Technique {
        match self {
            DrawCommand::Item { technique, .. } => *technique,
            DrawCommand::Fish { .. } => Technique::Fish,
            DrawCommand::Bubbles { .. } => Technique::Bubble,
            DrawCommand::Laser { .. } => Technique::Laser,
            DrawCommand::LightRay { .. } => Technique::LightRay,
        }
    }
}

/// Everything the planner reads for one frame.
pub struct FrameInputs<'a, I: Placed> {
    pub items: &'a [I],
    /// Live instances per fish render group.
    pub fish_counts: &'a [u32],
    pub clock: f32,
    pub options: &'a FeatureToggles,
    pub active_bubbles: usize,
    pub lasers: &'a [LaserInstance],
    pub light_rays: &'a [LightRay],
    pub eye_height: f32,
}

/// The ordered draws of one frame plus the object block each one reads.
#[derive(Default)]
pub struct FrameDrawList {
    pub objects: Vec<ObjectUniform>,
    pub commands: Vec<DrawCommand>,
}

impl FrameDrawList {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_object(&mut self, world: Mat4, aux: [f32; 4]) -> u32 {
        self.objects.push(ObjectUniform::new(world, aux));
        (self.objects.len() - 1) as u32
    }

    fn push_items<I: Placed>(&mut self, items: &[I], clock: f32, wanted: impl Fn(ItemKind) -> bool) {
        for (index, item) in items.iter().enumerate() {
            let placement = item.placement();
            if !wanted(placement.kind) {
                continue;
            }
            let aux = match placement.kind {
                ItemKind::Seaweed { time_offset } => [clock + time_offset, 0.0, 0.0, 0.0],
                _ => [0.0; 4],
            };
            let slot = self.push_object(placement.world, aux);
            self.commands.push(DrawCommand::Item {
                technique: placement.kind.technique(),
                item: index,
                slot,
            });
        }
    }

    /// Rebuilds the list in pass order: diffuse props, fish, seaweed, inner
    /// tank, outer tank, bubbles, lasers, light rays.
    pub fn rebuild<I: Placed>(&mut self, inputs: &FrameInputs<'_, I>) {
        self.objects.clear();
        self.commands.clear();
        let options = inputs.options;

        self.push_items(inputs.items, inputs.clock, |k| k == ItemKind::Diffuse);

        for (group, &instances) in inputs.fish_counts.iter().enumerate() {
            if instances > 0 {
                self.commands.push(DrawCommand::Fish { group, instances });
            }
        }

        self.push_items(inputs.items, inputs.clock, |k| {
            matches!(k, ItemKind::Seaweed { .. })
        });

        if options.tank {
            self.push_items(inputs.items, inputs.clock, |k| k == ItemKind::InnerTank);
            self.push_items(inputs.items, inputs.clock, |k| k == ItemKind::OuterTank);
        }

        if options.bubbles && inputs.active_bubbles > 0 {
            self.commands.push(DrawCommand::Bubbles {
                instances: inputs.active_bubbles as u32,
            });
        }

        if options.lasers {
            for laser in inputs.lasers {
                let slot = self.push_object(laser.world, [0.0; 4]);
                self.commands.push(DrawCommand::Laser { slot });
            }
        }

        if options.light_rays {
            for ray in inputs.light_rays {
                let alpha = ray.alpha();
                if alpha <= 0.0 {
                    continue;
                }
                let slot = self.push_object(ray.transform(inputs.eye_height), [alpha, 0.0, 0.0, 0.0]);
                self.commands.push(DrawCommand::LightRay { slot });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::ItemPlacement;
    use glam::Vec3;

    fn item(kind: ItemKind, x: f32) -> ItemPlacement {
        ItemPlacement {
            scene: 0,
            model: 0,
            world: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            kind,
        }
    }

    fn ray(timer: f32) -> LightRay {
        LightRay {
            timer,
            duration: 2.0,
            rotation: 0.0,
            x: 0.0,
            z: 0.0,
        }
    }

    struct Frame {
        items: Vec<ItemPlacement>,
        fish: Vec<u32>,
        lasers: Vec<LaserInstance>,
        rays: Vec<LightRay>,
        options: FeatureToggles,
        bubbles: usize,
    }

    impl Frame {
        fn new() -> Self {
            Self {
                items: vec![
                    item(ItemKind::OuterTank, 1.0),
                    item(ItemKind::Seaweed { time_offset: 2.0 }, 2.0),
                    item(ItemKind::Diffuse, 3.0),
                    item(ItemKind::InnerTank, 4.0),
                    item(ItemKind::Diffuse, 5.0),
                ],
                fish: vec![3, 0, 7],
                lasers: vec![LaserInstance {
                    world: Mat4::IDENTITY,
                }],
                rays: vec![ray(1.0), ray(0.0), ray(0.5)],
                options: FeatureToggles {
                    lasers: true,
                    ..Default::default()
                },
                bubbles: 100,
            }
        }

        fn plan(&self) -> FrameDrawList {
            let mut list = FrameDrawList::new();
            list.rebuild(&FrameInputs {
                items: &self.items,
                fish_counts: &self.fish,
                clock: 10.0,
                options: &self.options,
                active_bubbles: self.bubbles,
                lasers: &self.lasers,
                light_rays: &self.rays,
                eye_height: 7.5,
            });
            list
        }
    }

    #[test]
    fn passes_follow_fixed_order() {
        let list = Frame::new().plan();
        let techniques: Vec<_> = list.commands.iter().map(|c| c.technique()).collect();
        assert_eq!(
            techniques,
            vec![
                Technique::Diffuse,
                Technique::Diffuse,
                Technique::Fish,
                Technique::Fish,
                Technique::Seaweed,
                Technique::InnerTank,
                Technique::OuterTank,
                Technique::Bubble,
                Technique::Laser,
                Technique::LightRay,
                Technique::LightRay,
            ]
        );
        assert_eq!(
            list.commands[0],
            DrawCommand::Item {
                technique: Technique::Diffuse,
                item: 2,
                slot: 0
            }
        );
        assert_eq!(list.commands[3], DrawCommand::Fish { group: 2, instances: 7 });
    }

    #[test]
    fn slots_are_handed_out_in_draw_order() {
        let list = Frame::new().plan();
        let slots: Vec<u32> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Item { slot, .. }
                | DrawCommand::Laser { slot }
                | DrawCommand::LightRay { slot } => Some(*slot),
                _ => None,
            })
            .collect();
        let expected: Vec<u32> = (0..list.objects.len() as u32).collect();
        assert_eq!(slots, expected);
    }

    #[test]
    fn seaweed_and_light_rays_use_aux() {
        let list = Frame::new().plan();
        let seaweed = list
            .commands
            .iter()
            .find_map(|c| match c {
                DrawCommand::Item {
                    technique: Technique::Seaweed,
                    slot,
                    ..
                } => Some(*slot as usize),
                _ => None,
            })
            .unwrap();
        assert_eq!(list.objects[seaweed].aux[0], 12.0);

        let rays: Vec<f32> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::LightRay { slot } => Some(list.objects[*slot as usize].aux[0]),
                _ => None,
            })
            .collect();
        assert_eq!(rays.len(), 2);
        assert!((rays[0] - 1.0).abs() < 1e-6);
        assert!((rays[1] - (std::f32::consts::PI * 0.25).sin()).abs() < 1e-6);
    }

    #[test]
    fn toggles_gate_their_passes() {
        let mut frame = Frame::new();
        frame.options.tank = false;
        frame.options.bubbles = false;
        frame.options.lasers = false;
        frame.options.light_rays = false;
        let list = frame.plan();
        assert!(list.commands.iter().all(|c| matches!(
            c.technique(),
            Technique::Diffuse | Technique::Fish | Technique::Seaweed
        )));
        assert_eq!(list.objects.len(), 3);
    }

    #[test]
    fn bubbles_wait_for_the_first_emission() {
        let mut frame = Frame::new();
        frame.bubbles = 0;
        let list = frame.plan();
        assert!(!list.commands.iter().any(|c| matches!(c, DrawCommand::Bubbles { .. })));
    }

    #[test]
    fn rebuild_discards_the_previous_frame() {
        let frame = Frame::new();
        let mut list = frame.plan();
        let first = list.objects.len();
        list.rebuild(&FrameInputs::<ItemPlacement> {
            items: &[],
            fish_counts: &[],
            clock: 0.0,
            options: &frame.options,
            active_bubbles: 0,
            lasers: &[],
            light_rays: &[],
            eye_height: 0.0,
        });
        assert!(first > 0);
        assert!(list.objects.is_empty());
        assert!(list.commands.is_empty());
    }
}
// --- End of File: draw_list.rs ---
