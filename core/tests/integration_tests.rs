use framework_core::{
    Element, ExpressionKind, Framework, FrameworkError, Module, Package, Prefix, Release,
    ResolveMode, ResolveOptions, Section, TagFilter, resolve,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn single_element_framework(element: Element) -> Framework {
    Framework::new(Release::new(1, 2, 0))
        .with_prefix(Prefix::new("core", "CL", 0))
        .with_package(Package::new("pkgA").with_module(
            Module::new("modA").with_section(Section::new("secA").with_element(element)),
        ))
}

fn load_balancer_framework() -> Framework {
    Framework::new(Release::new(13, 1, 4))
        .with_prefix(Prefix::new("lb", "LB", 2))
        .with_prefix(Prefix::new("core", "CL", 1))
        .with_package(
            Package::new("netscaler")
                .with_module(
                    Module::new("base").with_section(
                        Section::new("core").with_element(
                            Element::new("stringmap")
                                .with_field("name", "<<prefix>>_SM")
                                .with_install("add policy stringmap <<name>>")
                                .with_uninstall("rm policy stringmap <<name>>"),
                        ),
                    ),
                )
                .with_module(
                    Module::new("traffic").with_section(
                        Section::new("lb")
                            .with_element(
                                Element::new("vserver")
                                    .with_field("name", "<<prefix>>_VS")
                                    .with_field("map", "<<netscaler.base.core.stringmap/name>>")
                                    .with_install("add lb vserver <<name>> -map <<map>>")
                                    .with_uninstall("rm lb vserver <<name>>"),
                            )
                            .with_element(
                                Element::new("preview")
                                    .with_tag("experimental")
                                    .with_field("name", "<<prefix>>_PREVIEW")
                                    .with_install("add lb vserver <<name>>")
                                    .with_uninstall("rm lb vserver <<name>>"),
                            ),
                    ),
                ),
        )
}

// ---------------------------------------------------------------------------
// End-to-end resolution
// ---------------------------------------------------------------------------

#[test]
fn test_single_element_install_expression() {
    let framework = single_element_framework(
        Element::new("elemA")
            .with_field("val", "42")
            .with_install("set <<val>> with <<core>>"),
    );

    let resolution = resolve(&framework, &ResolveOptions::default()).unwrap();
    assert_eq!(
        resolution.install["pkgA.modA.secA.elemA"],
        "set 42 with CL_1.2.0"
    );
    assert_eq!(resolution.uninstall["pkgA.modA.secA.elemA"], "");
    assert_eq!(resolution.prefixes["core"], "CL_1.2.0");
}

#[test]
fn test_cross_element_references_and_section_prefixes() {
    let resolution = resolve(&load_balancer_framework(), &ResolveOptions::default()).unwrap();

    assert_eq!(
        resolution.fields["netscaler.base.core.stringmap/name"],
        "CL_13.1.4_SM"
    );
    assert_eq!(
        resolution.fields["netscaler.traffic.lb.vserver/map"],
        "CL_13.1.4_SM"
    );
    assert_eq!(
        resolution.install["netscaler.traffic.lb.vserver"],
        "add lb vserver LB_13.1.4_VS -map CL_13.1.4_SM"
    );
    assert_eq!(
        resolution.uninstall["netscaler.base.core.stringmap"],
        "rm policy stringmap CL_13.1.4_SM"
    );
}

#[test]
fn test_tag_filter_gates_expressions_not_values() {
    let options = ResolveOptions::default().with_tag_filter(TagFilter::from_iter(["experimental"]));
    let resolution = resolve(&load_balancer_framework(), &options).unwrap();

    for kind in ExpressionKind::ALL {
        let expressions = resolution.expressions(kind);
        assert!(!expressions.contains_key("netscaler.traffic.lb.preview"));
        assert!(expressions.contains_key("netscaler.traffic.lb.vserver"));
    }
    assert!(resolution.elements.contains_key("netscaler.traffic.lb.preview"));
    assert_eq!(
        resolution.fields["netscaler.traffic.lb.preview/name"],
        "LB_13.1.4_PREVIEW"
    );

    let unfiltered = resolve(&load_balancer_framework(), &ResolveOptions::default()).unwrap();
    assert!(unfiltered.install.contains_key("netscaler.traffic.lb.preview"));
}

#[test]
fn test_resolution_is_deterministic() {
    let framework = load_balancer_framework();
    let first = resolve(&framework, &ResolveOptions::default()).unwrap();
    let second = resolve(&framework, &ResolveOptions::default()).unwrap();
    assert_eq!(first, second);

    let parallel = resolve(&framework, &ResolveOptions::default().with_jobs(4)).unwrap();
    assert_eq!(first, parallel);
}

// ---------------------------------------------------------------------------
// Namespace collisions
// ---------------------------------------------------------------------------

#[test]
fn test_same_element_name_in_different_sections() {
    let framework = Framework::new(Release::new(1, 0, 0)).with_package(
        Package::new("pkgA").with_module(
            Module::new("modA")
                .with_section(Section::new("secA").with_element(Element::new("x")))
                .with_section(Section::new("secB").with_element(Element::new("x"))),
        ),
    );

    let resolution = resolve(&framework, &ResolveOptions::default()).unwrap();
    assert!(resolution.elements.contains_key("pkgA.modA.secA.x"));
    assert!(resolution.elements.contains_key("pkgA.modA.secB.x"));
}

#[test]
fn test_same_full_path_is_rejected() {
    let module = Module::new("modA").with_section(Section::new("secA").with_element(Element::new("x")));
    let framework = Framework::new(Release::new(1, 0, 0)).with_package(
        Package::new("pkgA")
            .with_module(module.clone())
            .with_module(module),
    );

    let err = resolve(&framework, &ResolveOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        FrameworkError::DuplicateKey { ref key, ref owner } if key == "pkgA.modA.secA.x" && owner == "pkgA"
    ));
    assert!(err.to_string().contains("pkgA.modA.secA.x"));
}

#[test]
fn test_duplicate_prefix_section_is_rejected() {
    let framework = single_element_framework(Element::new("elemA"))
        .with_prefix(Prefix::new("core", "XX", 7));
    let err = resolve(&framework, &ResolveOptions::default()).unwrap_err();
    assert!(matches!(err, FrameworkError::DuplicateKey { key, .. } if key == "core"));
}

// ---------------------------------------------------------------------------
// Unresolved references and cycles
// ---------------------------------------------------------------------------

#[test]
fn test_unresolved_reference_becomes_empty_string() {
    let framework = single_element_framework(
        Element::new("elemA").with_install("bind <<pkgZ.m.s.e/name>> <<nosuchsection>>!"),
    );
    let resolution = resolve(&framework, &ResolveOptions::default()).unwrap();
    assert_eq!(resolution.install["pkgA.modA.secA.elemA"], "bind  !");
}

#[test]
fn test_unresolved_reference_fails_in_strict_mode() {
    let framework = single_element_framework(
        Element::new("elemA").with_install("bind <<pkgZ.m.s.e/name>>"),
    );
    let options = ResolveOptions::default().with_mode(ResolveMode::Strict);
    let err = resolve(&framework, &options).unwrap_err();
    assert_eq!(
        err,
        FrameworkError::UnresolvedReference {
            key: "pkgA.modA.secA.elemA".into(),
            reference: "pkgZ.m.s.e/name".into(),
        }
    );
}

#[test]
fn test_cyclic_field_references_terminate() {
    let framework = single_element_framework(
        Element::new("elemA")
            .with_field("a", "<<pkgA.modA.secA.elemA/b>>")
            .with_field("b", "<<pkgA.modA.secA.elemA/a>>"),
    );
    let err = resolve(&framework, &ResolveOptions::default()).unwrap_err();
    assert_eq!(
        err,
        FrameworkError::UnresolvableCycle {
            key: "pkgA.modA.secA.elemA/a".into(),
            chain: "pkgA.modA.secA.elemA/a -> pkgA.modA.secA.elemA/b -> pkgA.modA.secA.elemA/a"
                .into(),
        }
    );
}

#[test]
fn test_section_prefix_wins_over_field_named_like_section() {
    let framework = Framework::new(Release::new(1, 0, 0))
        .with_prefix(Prefix::new("lb", "LB", 0))
        .with_package(Package::new("pkgA").with_module(
            Module::new("modA").with_section(
                Section::new("lb").with_element(
                    Element::new("vip")
                        .with_field("lb", "vip")
                        .with_field("name", "<<prefix>>_VS")
                        .with_install("add <<prefix>>_x <<name>> <<lb>>"),
                ),
            ),
        ));

    let resolution = resolve(&framework, &ResolveOptions::default().with_mode(ResolveMode::Strict))
        .unwrap();
    assert_eq!(
        resolution.install["pkgA.modA.lb.vip"],
        "add LB_1.0.0_x LB_1.0.0_VS vip"
    );
    assert_eq!(resolution.fields["pkgA.modA.lb.vip/name"], "LB_1.0.0_VS");
}
