//! The `server` entity: table layout and every queryable field.

use crate::error::RegistryError;
use crate::registry::{EntityTable, FieldConfig, FieldType, Operator, RegistryCatalog, SqlType};

pub const ENTITY: &str = "server";

const EQ_NE_IN: &[Operator] = &[Operator::Eq, Operator::Ne, Operator::In];

pub fn table() -> EntityTable {
    use SqlType::*;
    EntityTable::new(ENTITY, "server", "id")
        .column("id", BigInt)
        .column("service_tag", Text)
        .column("name", Text)
        .column("agent_name", Text)
        .column("primary_ip", Text)
        .column("agent_ip", Text)
        .column("other_ip", Text)
        .column("port", Text)
        .column("manage_card_ip", Text)
        .column("manage_card_mac", Text)
        .column("manage_card_version", Text)
        .column("bios_version", Text)
        .column("raid_fw_version", Text)
        .column("agent_version", Text)
        .column("agent_kernel", Text)
        .column("use_status", Text)
        .column("service_level", Integer)
        .column("is_installing", Integer)
        .column("install_status", Text)
        .column("lock_status", Text)
        .column("due_date", Timestamp)
        .column("using_date", Timestamp)
        .column("is_vm", Integer)
        .column("real_server_id", BigInt)
        .column("vm_type", Text)
        .column("vm_network_type", Text)
        .column("instance_name", Text)
        .column("cpu_amount", Integer)
        .column("cpu_cores", Integer)
        .column("cpu_kernel_number", Numeric)
        .column("ram_amount", Integer)
        .column("ram_size", Numeric)
        .column("nic_amount", Integer)
        .column("storage_amount", Integer)
        .column("storage_info", Text)
        .column("filesystem_disk_space", Integer)
        .column("device_id", BigInt)
        .column("group_id", BigInt)
        .column("agent_os_id", BigInt)
        .column("template_id", BigInt)
        .column("image_id", BigInt)
        .column("network_segment_id", BigInt)
        .column("owner", Text)
        .column("label", Text)
        .column("description", Text)
        .column("created_by", Text)
        .column("created_date", Timestamp)
        .column("last_modified_by", Text)
        .column("last_modified_date", Timestamp)
        .column("is_valid", Boolean)
}

pub fn fields() -> Vec<FieldConfig> {
    let text = |name: &str, desc: &str| FieldConfig::new(name, FieldType::String, desc);
    let id = |name: &str, desc: &str| {
        FieldConfig::new(name, FieldType::Integer, desc).operators(EQ_NE_IN)
    };
    let count = |name: &str, desc: &str| FieldConfig::new(name, FieldType::Integer, desc);
    let amount = |name: &str, desc: &str| FieldConfig::new(name, FieldType::Float, desc);
    let choice = |name: &str, desc: &str, values: &[&str]| {
        FieldConfig::new(name, FieldType::Enum, desc).enum_values(values)
    };

    vec![
        id("id", "server id"),
        text("service_tag", "device serial number"),
        text("name", "server name"),
        text("description", "server description"),
        text("agent_name", "hostname reported by the agent"),
        text("primary_ip", "primary IP"),
        text("agent_ip", "IP reported by the agent"),
        text("other_ip", "other IP addresses"),
        text("port", "docker port"),
        text("manage_card_ip", "management card IP address"),
        text("manage_card_mac", "management card MAC address"),
        text("manage_card_version", "management card firmware version"),
        text("bios_version", "BIOS version"),
        text("raid_fw_version", "RAID controller firmware version"),
        text("agent_version", "agent version"),
        text("agent_kernel", "kernel reported by the agent"),
        FieldConfig::new("is_valid", FieldType::Boolean, "record is valid"),
        choice("use_status", "usage state", &["ready", "in_use", "maintenance"]),
        count("service_level", "service level"),
        id("is_installing", "installation in progress"),
        choice(
            "install_status",
            "installation state",
            &["uninstall", "installing", "installed", "failed"],
        ),
        choice("lock_status", "lock state", &["unlocked", "locked"]),
        FieldConfig::new("created_date", FieldType::Datetime, "creation time"),
        id("network_segment_id", "network segment id").multi_select(),
        id("is_vm", "is a virtual machine"),
        id("real_server_id", "host server id"),
        choice("vm_type", "virtual machine type", &["undefined", "kvm", "vmware", "docker"]),
        choice(
            "vm_network_type",
            "virtual machine network type",
            &["undefined", "bridge", "nat", "host"],
        ),
        text("instance_name", "instance name"),
        count("cpu_amount", "CPU count"),
        count("cpu_cores", "physical CPU cores"),
        amount("cpu_kernel_number", "CPU threads"),
        count("ram_amount", "memory module count"),
        amount("ram_size", "memory size in GB"),
        count("nic_amount", "NIC count"),
        count("storage_amount", "disk count"),
        text("storage_info", "storage layout"),
        count("filesystem_disk_space", "system disk space"),
        id("device_id", "device id"),
        id("group_id", "group id"),
        id("agent_os_id", "operating system id reported by the agent"),
        id("template_id", "installation template id"),
        id("image_id", "image id"),
        text("owner", "server owner"),
        text("label", "server label"),
    ]
}

pub fn register(catalog: &mut RegistryCatalog) -> Result<(), RegistryError> {
    catalog.add_entity(table())?;
    for field in fields() {
        let name = field.name.clone();
        catalog.register(ENTITY, &name, field)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn every_field_registers() {
        let mut catalog = RegistryCatalog::new();
        register(&mut catalog).unwrap();
        let fields = catalog.all_fields(ENTITY).unwrap();
        assert_eq!(fields.len(), super::fields().len());
        assert_eq!(fields.len(), 45);
    }

    #[test]
    fn operator_sets_follow_field_kind() {
        let mut catalog = RegistryCatalog::new();
        register(&mut catalog).unwrap();
        let ops = |name: &str| catalog.get(ENTITY, name).unwrap().operators.clone();

        assert_eq!(ops("is_valid"), BTreeSet::from([Operator::Eq, Operator::Ne]));
        assert_eq!(ops("group_id"), BTreeSet::from([Operator::Eq, Operator::Ne, Operator::In]));
        assert!(ops("service_tag").contains(&Operator::Like));
        assert!(ops("ram_size").contains(&Operator::Ge));
        assert!(!ops("created_date").contains(&Operator::In));
        assert!(catalog.get(ENTITY, "network_segment_id").unwrap().is_multi_select);
        assert!(!catalog.get(ENTITY, "service_tag").unwrap().is_multi_select);
    }
}
