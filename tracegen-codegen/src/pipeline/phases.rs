//! The built-in stages: validate, parse, extract, resolve-imports, emit.

use crate::{
    Error, ExtractOptions, ImportOptions, ProxyEmitter, Result, Stage, TemplateData,
    TemplateRegistry, extract_from, resolve_imports,
};

use super::{Phase, TaskContext};

/// Checks required fields and the template kind before any file is touched.
pub struct ValidatePhase<'r> {
    registry: &'r TemplateRegistry,
}

impl<'r> ValidatePhase<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self { registry }
    }
}

impl Phase for ValidatePhase<'_> {
    fn stage(&self) -> Stage {
        Stage::Validate
    }

    fn description(&self) -> &'static str {
        "Check the task configuration"
    }

    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let missing = ctx.task.missing_fields();
        if !missing.is_empty() {
            return Err(Error::config_with_help(
                format!("missing required field(s): {}", missing.join(", ")),
                "every task needs source, output, interface, package and template",
            ));
        }

        self.registry.lookup(&ctx.task.template)?;
        Ok(())
    }
}

/// Reads and parses the source file.
pub struct ParsePhase;

impl Phase for ParsePhase {
    fn stage(&self) -> Stage {
        Stage::Parse
    }

    fn description(&self) -> &'static str {
        "Parse the Go source file"
    }

    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let path = &ctx.task.source;
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file = tracegen_syntax::parse(&source, &path.display().to_string())?;

        tracing::debug!(
            path = %path.display(),
            package = %file.package,
            interfaces = file.interfaces.len(),
            "parsed source"
        );
        ctx.file = Some(file);
        Ok(())
    }
}

/// Extracts the interface's methods, qualifying local types when the proxy
/// lives in another package.
pub struct ExtractPhase;

impl Phase for ExtractPhase {
    fn stage(&self) -> Stage {
        Stage::Extract
    }

    fn description(&self) -> &'static str {
        "Extract the interface method signatures"
    }

    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let file = ctx.file(self.stage())?;
        let options = ExtractOptions {
            qualifier: ctx.is_cross_package()?.then(|| file.package.clone()),
        };

        let filename = ctx.task.source.display().to_string();
        let extraction = extract_from(file, &filename, &ctx.task.interface, &options)?;

        ctx.methods = extraction.methods;
        for diagnostic in extraction.diagnostics {
            ctx.add_diagnostic(diagnostic);
        }
        Ok(())
    }
}

/// Collects the source imports and, for cross-package proxies, the source
/// package's own import path.
pub struct ResolveImportsPhase;

impl Phase for ResolveImportsPhase {
    fn stage(&self) -> Stage {
        Stage::ResolveImports
    }

    fn description(&self) -> &'static str {
        "Resolve the imports of the generated file"
    }

    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let options = ImportOptions {
            module_root: ctx.task.module_root.clone(),
            self_import: ctx.task.self_import.clone(),
            include_self: ctx.is_cross_package()?,
        };
        let resolved = resolve_imports(&ctx.task.source, ctx.file(self.stage())?, &options)?;

        ctx.imports = Some(resolved);
        Ok(())
    }
}

/// Renders the template and writes (or, on a dry run, keeps) the result.
pub struct EmitPhase<'r> {
    registry: &'r TemplateRegistry,
    dry_run: bool,
}

impl<'r> EmitPhase<'r> {
    pub fn new(registry: &'r TemplateRegistry, dry_run: bool) -> Self {
        Self { registry, dry_run }
    }

    fn template_data(&self, ctx: &TaskContext<'_>) -> Result<TemplateData> {
        let task = ctx.task;
        let spec = self.registry.lookup(&task.template)?;
        let file = ctx.file(self.stage())?;

        let mut imports = ctx.imports(self.stage())?.set.clone();
        imports.merge(&spec.required_imports(&ctx.methods));

        let interface_prefix = if ctx.is_cross_package()? {
            format!("{}.", file.package)
        } else {
            String::new()
        };

        Ok(TemplateData {
            package_name: task.package.clone(),
            proxy_name: TemplateData::proxy_name_for(&task.interface),
            interface_name: task.interface.clone(),
            interface_prefix,
            tracer_name: task.tracer.clone(),
            template_kind: task.template.clone(),
            methods: ctx.methods.clone(),
            imports: imports.render(),
        })
    }
}

impl Phase for EmitPhase<'_> {
    fn stage(&self) -> Stage {
        Stage::Emit
    }

    fn description(&self) -> &'static str {
        "Render the proxy and write it"
    }

    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<()> {
        let data = self.template_data(ctx)?;
        let emitter = ProxyEmitter::new(self.registry);

        if self.dry_run {
            ctx.rendered = Some(emitter.render(&ctx.task.template, &data)?);
        } else {
            let result = emitter.emit(&ctx.task.template, &data, &ctx.task.output)?;
            ctx.write_result = Some(result);
        }
        Ok(())
    }
}
