//! The migration steps, in the order they must be run.

use std::fmt;
use std::str::FromStr;

use crate::error::MigrateError;

/// One subcommand of the migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ImportTenant,
    ImportUser,
    ImportUserRole,
    ImportHowHearAboutUsItem,
    ImportTag,
    ImportVehicleType,
    ImportInsuranceRequirement,
    ImportSkillSet,
    ImportSkillSetInsuranceRequirement,
    ImportServiceFee,
    ImportBulletins,
    ImportComment,
    ImportCustomer,
    ImportCustomerComment,
    ImportCustomerTag,
    ImportAssociate,
    ImportAssociateComment,
    ImportAssociateTag,
    ImportAssociateSkillSet,
    ImportAssociateVehicleType,
    ImportAssociateInsuranceRequirement,
    ImportAssociateAwayLog,
    ImportAssociateStatus,
    ImportStaff,
    ImportStaffComment,
    ImportOrder,
    ImportOrderComment,
    ImportOrderTag,
    ImportOrderSkillSet,
    ImportOrderInvoice,
    ImportOrderDeposit,
    ImportTaskItem,
    ImportActivitySheet,
    ImportAttachmentDownloadToTmpDir,
    ImportAttachmentUploadFromTmpDir,
    Hotfix01,
    Hotfix02,
    Hotfix03,
    Hotfix04,
    Hotfix05,
}

impl Step {
    /// Every step in dependency order.
    pub const ALL: [Step; 40] = [
        Step::ImportTenant,
        Step::ImportUser,
        Step::ImportUserRole,
        Step::ImportHowHearAboutUsItem,
        Step::ImportTag,
        Step::ImportVehicleType,
        Step::ImportInsuranceRequirement,
        Step::ImportSkillSet,
        Step::ImportSkillSetInsuranceRequirement,
        Step::ImportServiceFee,
        Step::ImportBulletins,
        Step::ImportComment,
        Step::ImportCustomer,
        Step::ImportCustomerComment,
        Step::ImportCustomerTag,
        Step::ImportAssociate,
        Step::ImportAssociateComment,
        Step::ImportAssociateTag,
        Step::ImportAssociateSkillSet,
        Step::ImportAssociateVehicleType,
        Step::ImportAssociateInsuranceRequirement,
        Step::ImportAssociateAwayLog,
        Step::ImportAssociateStatus,
        Step::ImportStaff,
        Step::ImportStaffComment,
        Step::ImportOrder,
        Step::ImportOrderComment,
        Step::ImportOrderTag,
        Step::ImportOrderSkillSet,
        Step::ImportOrderInvoice,
        Step::ImportOrderDeposit,
        Step::ImportTaskItem,
        Step::ImportActivitySheet,
        Step::ImportAttachmentDownloadToTmpDir,
        Step::ImportAttachmentUploadFromTmpDir,
        Step::Hotfix01,
        Step::Hotfix02,
        Step::Hotfix03,
        Step::Hotfix04,
        Step::Hotfix05,
    ];

    /// Subcommand name.
    pub fn name(self) -> &'static str {
        match self {
            Step::ImportTenant => "import_tenant",
            Step::ImportUser => "import_user",
            Step::ImportUserRole => "import_user_role",
            Step::ImportHowHearAboutUsItem => "import_how_hear_about_us_item",
            Step::ImportTag => "import_tag",
            Step::ImportVehicleType => "import_vehicle_type",
            Step::ImportInsuranceRequirement => "import_insurance_requirement",
            Step::ImportSkillSet => "import_skill_set",
            Step::ImportSkillSetInsuranceRequirement => "import_skill_set_insurance_requirement",
            Step::ImportServiceFee => "import_service_fee",
            Step::ImportBulletins => "import_bulletins",
            Step::ImportComment => "import_comment",
            Step::ImportCustomer => "import_customer",
            Step::ImportCustomerComment => "import_customer_comment",
            Step::ImportCustomerTag => "import_customer_tag",
            Step::ImportAssociate => "import_associate",
            Step::ImportAssociateComment => "import_associate_comment",
            Step::ImportAssociateTag => "import_associate_tag",
            Step::ImportAssociateSkillSet => "import_associate_skill_set",
            Step::ImportAssociateVehicleType => "import_associate_vehicle_type",
            Step::ImportAssociateInsuranceRequirement => "import_associate_insurance_requirement",
            Step::ImportAssociateAwayLog => "import_associate_away_log",
            Step::ImportAssociateStatus => "import_associate_status",
            Step::ImportStaff => "import_staff",
            Step::ImportStaffComment => "import_staff_comment",
            Step::ImportOrder => "import_order",
            Step::ImportOrderComment => "import_order_comment",
            Step::ImportOrderTag => "import_order_tag",
            Step::ImportOrderSkillSet => "import_order_skill_set",
            Step::ImportOrderInvoice => "import_order_invoice",
            Step::ImportOrderDeposit => "import_order_deposit",
            Step::ImportTaskItem => "import_task_item",
            Step::ImportActivitySheet => "import_activity_sheet",
            Step::ImportAttachmentDownloadToTmpDir => "import_attachment_download_to_tmp_dir",
            Step::ImportAttachmentUploadFromTmpDir => "import_attachment_upload_from_tmp_dir",
            Step::Hotfix01 => "hotfix01",
            Step::Hotfix02 => "hotfix02",
            Step::Hotfix03 => "hotfix03",
            Step::Hotfix04 => "hotfix04",
            Step::Hotfix05 => "hotfix05",
        }
    }

    /// Whether the step reads the legacy database.
    pub fn needs_source(self) -> bool {
        !matches!(
            self,
            Step::ImportAttachmentUploadFromTmpDir
                | Step::Hotfix02
                | Step::Hotfix03
                | Step::Hotfix04
                | Step::Hotfix05
        )
    }

    /// Whether the step reads the legacy object store.
    pub fn needs_legacy_objects(self) -> bool {
        matches!(self, Step::ImportAttachmentDownloadToTmpDir | Step::Hotfix04)
    }

    /// Whether the step writes the new object store.
    pub fn needs_objects(self) -> bool {
        matches!(self, Step::ImportAttachmentUploadFromTmpDir)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Step {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Step::ALL
            .iter()
            .copied()
            .find(|step| step.name() == s)
            .ok_or_else(|| MigrateError::Config(format!("unknown step '{}'", s)))
    }
}
