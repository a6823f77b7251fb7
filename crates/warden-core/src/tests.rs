#[cfg(test)]
mod tests {
    use crate::commands::OperatorCommand;
    use crate::components::*;
    use crate::enums::*;
    use crate::state::EngineSnapshot;
    use crate::types::{Position, SimTime, Velocity};

    /// Verify the kind enums round-trip through serde_json.
    #[test]
    fn test_weapon_kind_serde() {
        let variants = vec![
            WeaponKind::Gun,
            WeaponKind::Rocket,
            WeaponKind::DirectedEnergy,
            WeaponKind::GuidedMissile,
            WeaponKind::UnpoweredBomb,
            WeaponKind::SubsurfaceWeapon,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: WeaponKind = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_targeting_mode_serde() {
        let variants = vec![
            TargetingMode::None,
            TargetingMode::Heat,
            TargetingMode::RadarActive,
            TargetingMode::RadarSemiActive,
            TargetingMode::Laser,
            TargetingMode::Satellite,
            TargetingMode::Inertial,
            TargetingMode::AntiEmission,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: TargetingMode = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    /// Lock-bearing modes name their prerequisite sensor; the rest need none.
    #[test]
    fn test_targeting_mode_required_sensor() {
        assert_eq!(
            TargetingMode::RadarActive.required_sensor(),
            Some(SensorKind::Radar)
        );
        assert_eq!(
            TargetingMode::RadarSemiActive.required_sensor(),
            Some(SensorKind::Radar)
        );
        assert_eq!(
            TargetingMode::Heat.required_sensor(),
            Some(SensorKind::Infrared)
        );
        assert_eq!(
            TargetingMode::Laser.required_sensor(),
            Some(SensorKind::Laser)
        );
        assert_eq!(TargetingMode::Satellite.required_sensor(), None);
        assert_eq!(TargetingMode::Inertial.required_sensor(), None);
        assert_eq!(TargetingMode::AntiEmission.required_sensor(), None);
        assert_eq!(TargetingMode::None.required_sensor(), None);
    }

    /// Every WeaponSpec variant maps to exactly one kind tag.
    #[test]
    fn test_weapon_spec_kind_total() {
        let specs = vec![
            WeaponSpec::Gun(GunSpec {
                rate_of_fire_rpm: 600.0,
                caliber_mm: 30.0,
                muzzle_velocity_mps: 1000.0,
                blast_radius_m: 2.0,
                proximity_fuze: false,
                projectiles_per_shot: 1,
            }),
            WeaponSpec::Rocket(RocketSpec {
                rate_of_fire_rpm: 120.0,
                velocity_mps: 400.0,
                blast_radius_m: 8.0,
                proximity_fuze: true,
                rockets_per_salvo: 4,
            }),
            WeaponSpec::DirectedEnergy(BeamSpec {
                electro_optical: false,
                power_kw: 50.0,
            }),
            WeaponSpec::GuidedMissile(MissileSpec {
                targeting_mode: TargetingMode::RadarActive,
                min_launch_speed: 0.0,
                maneuverability_g: 25.0,
                blast_radius_m: 15.0,
                yield_kg: 50.0,
                time_to_effect_secs: 20.0,
                bay_id: None,
                max_on_target: 2,
            }),
            WeaponSpec::UnpoweredBomb(BombSpec {
                yield_kg: 250.0,
                submunitions: false,
                guided: false,
                release_range_m: 1500.0,
                max_per_target: 4,
                bay_id: Some(1),
            }),
            WeaponSpec::Subsurface(SubsurfaceSpec {
                kind: SubsurfaceKind::Torpedo,
                min_safe_blast_range_m: 300.0,
                max_depth_m: 200.0,
            }),
        ];
        let kinds: Vec<WeaponKind> = specs.iter().map(|s| s.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                WeaponKind::Gun,
                WeaponKind::Rocket,
                WeaponKind::DirectedEnergy,
                WeaponKind::GuidedMissile,
                WeaponKind::UnpoweredBomb,
                WeaponKind::SubsurfaceWeapon,
            ]
        );
    }

    /// Classification precedence: missile > submerged > air > surface.
    #[test]
    fn test_target_classification() {
        let mut track = TargetTrack {
            track_id: 1,
            team: 2,
            airborne: true,
            surfaced: false,
            submerged: false,
            is_missile: true,
            detected_by: Vec::new(),
            engaged_by: Vec::new(),
            mass_t: 1.0,
            weapon_count: 0,
            damage_fraction: 0.0,
            threat_rating: 1.0,
            vip: false,
        };
        assert_eq!(track.classify(), TargetClass::Missile);

        track.is_missile = false;
        assert_eq!(track.classify(), TargetClass::Air);

        track.airborne = false;
        track.submerged = true;
        assert_eq!(track.classify(), TargetClass::Submerged);

        track.submerged = false;
        track.surfaced = true;
        assert_eq!(track.classify(), TargetClass::Surface);
    }

    /// Undeclared roles are eligible everywhere; declared roles filter.
    #[test]
    fn test_engage_roles_eligibility() {
        let undeclared = EngageRoles::default();
        assert!(undeclared.eligible(TargetClass::Air));
        assert!(undeclared.eligible(TargetClass::Missile));
        assert!(undeclared.eligible(TargetClass::Surface));
        assert!(undeclared.eligible(TargetClass::Submerged));

        let air_only = EngageRoles {
            air: true,
            ..Default::default()
        };
        assert!(air_only.eligible(TargetClass::Air));
        assert!(!air_only.eligible(TargetClass::Surface));
    }

    #[test]
    fn test_engagement_count_helpers() {
        let track = TargetTrack {
            track_id: 9,
            team: 2,
            airborne: true,
            surfaced: false,
            submerged: false,
            is_missile: false,
            detected_by: Vec::new(),
            engaged_by: vec![
                PlatformCount {
                    platform_track: 1,
                    count: 2,
                },
                PlatformCount {
                    platform_track: 3,
                    count: 1,
                },
            ],
            mass_t: 5.0,
            weapon_count: 2,
            damage_fraction: 0.0,
            threat_rating: 1.0,
            vip: false,
        };
        assert_eq!(track.engagement_count(), 3);
        assert_eq!(track.engagement_count_for(1), 2);
        assert_eq!(track.engagement_count_for(99), 0);
    }

    #[test]
    fn test_operator_command_serde() {
        let commands = vec![
            OperatorCommand::ToggleGuardMode { platform_track: 1 },
            OperatorCommand::Fire { platform_track: 1 },
            OperatorCommand::CycleWeapon { platform_track: 1 },
            OperatorCommand::OverrideTarget {
                platform_track: 1,
                target_track: 7,
            },
            OperatorCommand::DropCountermeasure {
                platform_track: 1,
                cm_type: CountermeasureType::Flare,
            },
            OperatorCommand::Pause,
            OperatorCommand::Resume,
        ];
        for cmd in &commands {
            let json = serde_json::to_string(cmd).unwrap();
            let back: OperatorCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(json, serde_json::to_string(&back).unwrap());
        }
    }

    #[test]
    fn test_snapshot_serde() {
        let snapshot = EngineSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: EngineSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.time.tick, back.time.tick);
        assert!(
            json.len() < 1024,
            "Empty snapshot should be <1KB, was {} bytes",
            json.len()
        );
    }

    #[test]
    fn test_position_range_and_bearing() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.range_to(&b) - 5.0).abs() < 1e-10);

        let east = Position::new(100.0, 0.0, 0.0);
        assert!((a.bearing_to(&east) - std::f64::consts::FRAC_PI_2).abs() < 1e-10);
    }

    #[test]
    fn test_position_extrapolation() {
        let p = Position::new(0.0, 0.0, 100.0);
        let v = Velocity::new(10.0, -5.0, 0.0);
        let q = p.extrapolated(&v, 2.0);
        assert!((q.x - 20.0).abs() < 1e-10);
        assert!((q.y + 10.0).abs() < 1e-10);
        assert!((q.z - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..30 {
            time.advance();
        }
        assert_eq!(time.tick, 30);
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }
}
