use std::collections::HashSet;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ParseError;
use crate::models::{Dependency, Ecosystem};

/// Analyzer for SDK-style `.csproj` files.
///
/// Reads `<PackageReference Include="..." Version="..." />` elements. A
/// reference missing either attribute, or whose version is an unresolved
/// MSBuild property such as `$(SerilogVersion)`, is dropped.
pub struct DotNetAnalyzer;

impl super::Analyzer for DotNetAnalyzer {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::DotNet
    }

    fn analyze(&self, content: &str) -> Result<Vec<Dependency>, ParseError> {
        let mut reader = Reader::from_str(content);
        reader.config_mut().trim_text(true);

        let mut deps = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Empty(ref e) | Event::Start(ref e)
                    if e.name().local_name().as_ref() == b"PackageReference" =>
                {
                    let mut name = String::new();
                    let mut version = String::new();
                    for attr in e.attributes().flatten() {
                        let val = attr.unescape_value().unwrap_or_default().trim().to_string();
                        match attr.key.local_name().as_ref() {
                            b"Include" => name = val,
                            b"Version" => version = val,
                            _ => {}
                        }
                    }

                    if name.is_empty() || version.is_empty() || version.contains("$(") {
                        tracing::trace!(package = %name, "skipping incomplete PackageReference");
                    } else if seen.insert((name.clone(), version.clone())) {
                        deps.push(Dependency::new(Ecosystem::DotNet, name, version));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::Analyzer;

    fn keys(content: &str) -> Vec<String> {
        DotNetAnalyzer
            .analyze(content)
            .unwrap()
            .iter()
            .map(Dependency::key)
            .collect()
    }

    #[test]
    fn test_parse_csproj() {
        let xml = r#"<Project Sdk="Microsoft.NET.Sdk">
  <ItemGroup>
    <PackageReference Include="Newtonsoft.Json" Version="13.0.1" />
    <PackageReference Include="Serilog" Version="2.12.0"></PackageReference>
  </ItemGroup>
</Project>"#;
        assert_eq!(keys(xml), vec!["Newtonsoft.Json@13.0.1", "Serilog@2.12.0"]);
    }

    #[test]
    fn test_duplicate_reference_emitted_once() {
        let xml = r#"<Project>
  <ItemGroup Condition="'$(TargetFramework)' == 'net8.0'">
    <PackageReference Include="Polly" Version="8.2.0" />
  </ItemGroup>
  <ItemGroup Condition="'$(TargetFramework)' == 'net6.0'">
    <PackageReference Include="Polly" Version="8.2.0" />
  </ItemGroup>
</Project>"#;
        assert_eq!(keys(xml), vec!["Polly@8.2.0"]);
    }

    #[test]
    fn test_missing_version_dropped_siblings_kept() {
        let xml = r#"<Project>
  <ItemGroup>
    <PackageReference Include="Microsoft.AspNetCore.App" />
    <PackageReference Include="Dapper" Version="2.1.28" />
    <PackageReference Version="1.0.0" />
  </ItemGroup>
</Project>"#;
        assert_eq!(keys(xml), vec!["Dapper@2.1.28"]);
    }

    #[test]
    fn test_property_expression_version_dropped() {
        let xml = r#"<Project>
  <ItemGroup>
    <PackageReference Include="Serilog" Version="$(SerilogVersion)" />
    <PackageReference Include="xunit" Version="2.6.6" />
  </ItemGroup>
</Project>"#;
        assert_eq!(keys(xml), vec!["xunit@2.6.6"]);
    }

    #[test]
    fn test_same_package_different_versions_kept() {
        let xml = r#"<Project>
  <ItemGroup>
    <PackageReference Include="Moq" Version="4.18.0" />
    <PackageReference Include="Moq" Version="4.20.0" />
  </ItemGroup>
</Project>"#;
        assert_eq!(keys(xml), vec!["Moq@4.18.0", "Moq@4.20.0"]);
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let xml = "<Project><ItemGroup></Project>";
        assert!(matches!(
            DotNetAnalyzer.analyze(xml),
            Err(ParseError::Xml(_))
        ));
    }

    #[test]
    fn test_no_references() {
        assert!(keys("<Project Sdk=\"Microsoft.NET.Sdk\" />").is_empty());
    }
}
