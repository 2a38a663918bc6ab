//! Template rendering for attribute set assets.
//!
//! Pure mapping from a validated [`AttributeSetAsset`] to the segment
//! lists of the three output files: the class header, the class source
//! and the stub generated header. Rendering is deterministic: identical
//! assets always produce byte-identical output. Attribute order is the
//! input order and the metadata comment field order is fixed.

use crate::asset::{AttributeDefinition, AttributeSetAsset};
use crate::template::{FileKind, RegionStyle, RenderedFile, RenderedSet, Segment};

const HEADER_INCLUDES_KEY: &str = "HeaderIncludes";
const CLASS_EXTRA_MEMBERS_KEY: &str = "ClassExtraMembers";
const SOURCE_INCLUDES_KEY: &str = "SourceIncludes";

const INCLUDES_DEFAULT_BODY: &str = "// Add additional includes here.\n";
const CLASS_EXTRA_MEMBERS_DEFAULT_BODY: &str = "    // Add additional members here.\n";
const CONSTRUCTOR_DEFAULT_BODY: &str = "    // Initialize default attribute values here.\n";
const PRE_CHANGE_DEFAULT_BODY: &str = "    // Customize pre-attribute change logic here.\n";
const POST_CHANGE_DEFAULT_BODY: &str = "    // Customize post-attribute change logic here.\n";
const ON_REP_DEFAULT_BODY: &str = "    // Customize replication callback logic here.\n";
const EXTRA_METHODS_DEFAULT_BODY: &str = "// Add additional helper methods here.\n";

/// Renders all output files for one asset.
pub fn render(asset: &AttributeSetAsset) -> RenderedSet {
    RenderedSet {
        header: render_header(asset),
        source: render_source(asset),
        generated_header: render_generated_header(asset),
    }
}

/// Renders the class declaration header.
pub fn render_header(asset: &AttributeSetAsset) -> RenderedFile {
    let class = &asset.class_name;
    let mut segments = Vec::new();

    let mut includes = String::new();
    includes.push_str("#pragma once\n\n");
    includes.push_str("#include \"CoreMinimal.h\"\n");
    includes.push_str("#include \"AttributeSet.h\"\n");
    includes.push_str("#include \"AbilitySystemComponent.h\"\n");
    if asset.requires_meta_registry() {
        includes.push_str("#include \"MetaAttributeRegistry.h\"\n");
    }
    segments.push(Segment::literal(includes));
    segments.push(Segment::region(
        HEADER_INCLUDES_KEY,
        "",
        RegionStyle::Angle,
        INCLUDES_DEFAULT_BODY,
    ));

    let mut body = String::new();
    body.push_str(&format!(
        "\n#include \"{}.generated.h\"\n\n",
        asset.file_basename()
    ));
    body.push_str("UCLASS()\n");
    body.push_str(&format!(
        "class {} {class} : public UAttributeSet\n",
        asset.module_api
    ));
    body.push_str("{\n");
    body.push_str("    GENERATED_BODY()\n\n");
    body.push_str("public:\n");
    body.push_str(&format!("    {class}();\n\n"));
    body.push_str("    virtual void GetLifetimeReplicatedProps(TArray<FLifetimeProperty>& OutLifetimeProps) const override;\n");
    body.push_str(
        "    virtual void PreAttributeChange(const FGameplayAttribute& Attribute, float& NewValue) override;\n",
    );
    body.push_str(
        "    virtual void PostAttributeChange(const FGameplayAttribute& Attribute, float OldValue, float NewValue) override;\n",
    );

    for attribute in &asset.attributes {
        body.push('\n');
        body.push_str(&render_property(asset, attribute));
    }

    for attribute in replicated_with_callback(asset) {
        body.push_str(&format!(
            "\n    UFUNCTION()\n    void OnRep_{}(const FGameplayAttributeData& OldValue);\n",
            attribute.name
        ));
    }

    body.push('\n');
    segments.push(Segment::literal(body));
    segments.push(Segment::region(
        CLASS_EXTRA_MEMBERS_KEY,
        "    ",
        RegionStyle::Angle,
        CLASS_EXTRA_MEMBERS_DEFAULT_BODY,
    ));
    segments.push(Segment::literal("};\n"));

    RenderedFile::new(FileKind::Header, segments)
}

/// Renders the class definition source file.
pub fn render_source(asset: &AttributeSetAsset) -> RenderedFile {
    let class = &asset.class_name;
    let mut segments = Vec::new();

    segments.push(Segment::literal(format!(
        "#include \"{}.h\"\n\n#include \"Net/UnrealNetwork.h\"\n\n",
        asset.file_basename()
    )));
    segments.push(Segment::region(
        SOURCE_INCLUDES_KEY,
        "",
        RegionStyle::Bare,
        INCLUDES_DEFAULT_BODY,
    ));

    segments.push(Segment::literal(format!("\n{class}::{class}()\n{{\n")));
    segments.push(Segment::region(
        format!("{class}.Constructor"),
        "    ",
        RegionStyle::Bare,
        CONSTRUCTOR_DEFAULT_BODY,
    ));

    let mut lifetime = String::new();
    lifetime.push_str("}\n\n");
    lifetime.push_str(&format!(
        "void {class}::GetLifetimeReplicatedProps(TArray<FLifetimeProperty>& OutLifetimeProps) const\n"
    ));
    lifetime.push_str("{\n");
    lifetime.push_str("    Super::GetLifetimeReplicatedProps(OutLifetimeProps);\n");
    for attribute in &asset.attributes {
        if !attribute.metadata.replicate {
            continue;
        }
        if attribute.metadata.skip_on_rep {
            lifetime.push_str(&format!(
                "    DOREPLIFETIME({class}, {});\n",
                attribute.name
            ));
        } else {
            lifetime.push_str(&format!(
                "    DOREPLIFETIME_CONDITION_NOTIFY({class}, {}, COND_None, REPNOTIFY_Always);\n",
                attribute.name
            ));
        }
    }
    lifetime.push_str("}\n\n");

    lifetime.push_str(&format!(
        "void {class}::PreAttributeChange(const FGameplayAttribute& Attribute, float& NewValue)\n"
    ));
    lifetime.push_str("{\n");
    lifetime.push_str("    Super::PreAttributeChange(Attribute, NewValue);\n");
    for attribute in &asset.attributes {
        if attribute.metadata.generate_hooks {
            lifetime.push_str(&render_pre_change_guard(attribute));
        }
    }
    segments.push(Segment::literal(lifetime));
    segments.push(Segment::region(
        format!("{class}.PreAttributeChange"),
        "    ",
        RegionStyle::Bare,
        PRE_CHANGE_DEFAULT_BODY,
    ));

    let mut post = String::new();
    post.push_str("}\n\n");
    post.push_str(&format!(
        "void {class}::PostAttributeChange(const FGameplayAttribute& Attribute, float OldValue, float NewValue)\n"
    ));
    post.push_str("{\n");
    post.push_str("    Super::PostAttributeChange(Attribute, OldValue, NewValue);\n");
    post.push_str("    UE_UNUSED(OldValue);\n");
    post.push_str("    UE_UNUSED(NewValue);\n");
    for attribute in &asset.attributes {
        if attribute.metadata.generate_hooks {
            post.push_str(&render_post_change_guard(attribute));
        }
    }
    segments.push(Segment::literal(post));
    segments.push(Segment::region(
        format!("{class}.PostAttributeChange"),
        "    ",
        RegionStyle::Bare,
        POST_CHANGE_DEFAULT_BODY,
    ));
    segments.push(Segment::literal("}\n"));

    for attribute in replicated_with_callback(asset) {
        let mut on_rep = String::new();
        on_rep.push_str(&format!(
            "\nvoid {class}::OnRep_{}(const FGameplayAttributeData& OldValue)\n",
            attribute.name
        ));
        on_rep.push_str("{\n");
        on_rep.push_str(&format!(
            "    GAMEPLAYATTRIBUTE_REPNOTIFY({class}, {}, OldValue);\n",
            attribute.name
        ));
        segments.push(Segment::literal(on_rep));
        segments.push(Segment::region(
            format!("{class}.OnRep_{}", attribute.name),
            "    ",
            RegionStyle::Bare,
            ON_REP_DEFAULT_BODY,
        ));
        segments.push(Segment::literal("}\n"));
    }

    segments.push(Segment::literal("\n"));
    segments.push(Segment::region(
        format!("{class}.ExtraMethods"),
        "",
        RegionStyle::Bare,
        EXTRA_METHODS_DEFAULT_BODY,
    ));

    RenderedFile::new(FileKind::Source, segments)
}

/// Renders the stub generated header; Unreal's header tool replaces this
/// file in real builds, so it carries no preserve regions.
pub fn render_generated_header(asset: &AttributeSetAsset) -> RenderedFile {
    RenderedFile::new(
        FileKind::GeneratedHeader,
        vec![Segment::literal(format!(
            "#pragma once\n\n// Stub generated header for {}. In Unreal builds this file is replaced by UHT.\n",
            asset.class_name
        ))],
    )
}

fn render_property(asset: &AttributeSetAsset, attribute: &AttributeDefinition) -> String {
    let mut lines = format!(
        "    // Attribute: {}\n    // Metadata: {}\n",
        attribute.name,
        metadata_comment(attribute)
    );
    if let Some(comment) = &attribute.comment {
        lines.push_str(&format!("    // {comment}\n"));
    }

    let mut specifiers = vec![
        "BlueprintReadOnly".to_string(),
        format!("Category=\"{}\"", attribute.category),
    ];
    if attribute.metadata.replicate {
        if attribute.metadata.skip_on_rep {
            specifiers.push("Replicated".to_string());
        } else {
            specifiers.push(format!("ReplicatedUsing=OnRep_{}", attribute.name));
        }
    }

    let mut meta_parts = Vec::new();
    if let Some(clamp_min) = attribute.metadata.clamp_min {
        meta_parts.push(format!("ClampMin=\"{}\"", format_float(clamp_min)));
    }
    if let Some(clamp_max) = attribute.metadata.clamp_max {
        meta_parts.push(format!("ClampMax=\"{}\"", format_float(clamp_max)));
    }
    let meta_block = if meta_parts.is_empty() {
        String::new()
    } else {
        format!(", meta=({})", meta_parts.join(", "))
    };

    lines.push_str(&format!(
        "    UPROPERTY({}{})\n",
        specifiers.join(", "),
        meta_block
    ));
    lines.push_str(&format!(
        "    FGameplayAttributeData {};\n",
        attribute.name
    ));
    lines.push_str(&format!(
        "    ATTRIBUTE_ACCESSORS({}, {});\n",
        asset.class_name, attribute.name
    ));
    lines
}

fn render_pre_change_guard(attribute: &AttributeDefinition) -> String {
    let mut guard = format!(
        "    if (Attribute == Get{}Attribute())\n    {{\n        // Metadata: {}\n",
        attribute.name,
        metadata_comment(attribute)
    );
    if attribute.metadata.clamp_min.is_some() || attribute.metadata.clamp_max.is_some() {
        let clamp_min = attribute
            .metadata
            .clamp_min
            .map(format_float)
            .unwrap_or_else(|| "-FLT_MAX".to_string());
        let clamp_max = attribute
            .metadata
            .clamp_max
            .map(format_float)
            .unwrap_or_else(|| "FLT_MAX".to_string());
        guard.push_str(&format!(
            "        const float ClampedValue = FMath::Clamp(NewValue, {clamp_min}, {clamp_max});\n"
        ));
        guard.push_str("        NewValue = ClampedValue;\n");
    }
    guard.push_str("    }\n");
    guard
}

fn render_post_change_guard(attribute: &AttributeDefinition) -> String {
    format!(
        "    if (Attribute == Get{}Attribute())\n    {{\n        // Metadata: {}\n    }}\n",
        attribute.name,
        metadata_comment(attribute)
    )
}

/// The descriptive comment summarizing resolved metadata: the three flags
/// always, optional fields only when present, field order fixed.
fn metadata_comment(attribute: &AttributeDefinition) -> String {
    let metadata = &attribute.metadata;
    let mut parts = vec![
        format!("Replicate={}", metadata.replicate),
        format!("GenerateHooks={}", metadata.generate_hooks),
        format!("SkipOnRep={}", metadata.skip_on_rep),
    ];
    if let Some(clamp_min) = metadata.clamp_min {
        parts.push(format!("ClampMin={}", format_float(clamp_min)));
    }
    if let Some(clamp_max) = metadata.clamp_max {
        parts.push(format!("ClampMax={}", format_float(clamp_max)));
    }
    if let Some(meta_attribute) = &metadata.meta_attribute {
        parts.push(format!("MetaAttribute={meta_attribute}"));
    }
    parts.join(", ")
}

fn replicated_with_callback(asset: &AttributeSetAsset) -> Vec<&AttributeDefinition> {
    asset
        .attributes
        .iter()
        .filter(|attribute| attribute.metadata.replicate && !attribute.metadata.skip_on_rep)
        .collect()
}

/// Formats a clamp bound the way the asset authors expect to read it:
/// whole numbers keep a trailing `.0`.
fn format_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
